//! Microphone level meter
//!
//! Keeps a rolling analysis window of recent samples and reduces it to a
//! normalized 0..1 voice level for UI feedback. The level is the average
//! magnitude across the lower half of the discrete spectrum of the
//! window, with half of full scale mapping to 1.0, so ordinary speech
//! sweeps most of the range.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct Inner {
    window: VecDeque<f32>,
    window_size: usize,
    level: f32,
}

/// Shared level meter handle
///
/// The capture worker writes samples; the UI layer polls `level()`.
#[derive(Clone)]
pub struct LevelMeter {
    inner: Arc<Mutex<Inner>>,
}

impl LevelMeter {
    pub fn new(window_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                window: VecDeque::with_capacity(window_size),
                window_size,
                level: 0.0,
            })),
        }
    }

    /// Feed captured samples and refresh the level
    pub fn push(&self, samples: &[f32]) {
        let mut inner = self.inner.lock();
        for &sample in samples {
            if inner.window.len() == inner.window_size {
                inner.window.pop_front();
            }
            inner.window.push_back(sample);
        }
        if inner.window.len() == inner.window_size {
            let window: Vec<f32> = inner.window.iter().copied().collect();
            inner.level = spectral_level(&window);
        }
    }

    /// Current normalized voice level in 0..1
    pub fn level(&self) -> f32 {
        self.inner.lock().level
    }

    /// Drop all state, returning the level to 0
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.window.clear();
        inner.level = 0.0;
    }
}

/// Average magnitude of the lower half of the window's spectrum,
/// normalized so half of full scale reads as 1.0.
fn spectral_level(window: &[f32]) -> f32 {
    let n = window.len();
    if n == 0 {
        return 0.0;
    }

    let bins = n / 2;
    let mut sum = 0.0f32;
    for k in 0..bins {
        let mut re = 0.0f32;
        let mut im = 0.0f32;
        for (i, &sample) in window.iter().enumerate() {
            let angle = -2.0 * std::f32::consts::PI * (k as f32) * (i as f32) / (n as f32);
            re += sample * angle.cos();
            im += sample * angle.sin();
        }
        sum += (re * re + im * im).sqrt() / (n as f32);
    }

    let average = sum / bins.max(1) as f32;
    (average / 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_reads_zero() {
        let meter = LevelMeter::new(256);
        meter.push(&vec![0.0; 512]);
        assert_eq!(meter.level(), 0.0);
    }

    #[test]
    fn test_tone_reads_above_zero_and_bounded() {
        let meter = LevelMeter::new(256);
        let tone: Vec<f32> = (0..512)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 16000.0).sin() * 0.5)
            .collect();
        meter.push(&tone);

        let level = meter.level();
        assert!(level > 0.0);
        assert!(level <= 1.0);
    }

    #[test]
    fn test_louder_input_reads_higher() {
        let quiet = LevelMeter::new(256);
        let loud = LevelMeter::new(256);
        let tone: Vec<f32> = (0..256)
            .map(|i| (i as f32 * 300.0 * 2.0 * std::f32::consts::PI / 16000.0).sin())
            .collect();

        quiet.push(&tone.iter().map(|s| s * 0.05).collect::<Vec<_>>());
        loud.push(&tone.iter().map(|s| s * 0.8).collect::<Vec<_>>());
        assert!(loud.level() > quiet.level());
    }

    #[test]
    fn test_reset_clears_level() {
        let meter = LevelMeter::new(8);
        meter.push(&[0.9; 16]);
        assert!(meter.level() > 0.0);
        meter.reset();
        assert_eq!(meter.level(), 0.0);
    }
}
