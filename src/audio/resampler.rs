//! Streaming sample-rate conversion
//!
//! The capture device rarely runs at the 16 kHz the wire requires, so the
//! capture worker converts continuously. Input is buffered internally and
//! processed in fixed chunks; the remainder carries over to the next call,
//! which keeps the conversion artifact-free across callback boundaries.

use crate::{Result, VoiceError};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_SIZE: usize = 1024;

/// Mono audio resampler for converting between sample rates
pub struct AudioResampler {
    resampler: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    /// Create a new resampler; equal rates become a pass-through
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(VoiceError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let resampler = if input_rate != output_rate {
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            };

            let ratio = output_rate as f64 / input_rate as f64;
            let resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1).map_err(
                |e| VoiceError::AudioProcessingError(format!("Failed to create resampler: {}", e)),
            )?;

            debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);
            Some(resampler)
        } else {
            None
        };

        Ok(Self {
            resampler,
            pending: Vec::with_capacity(CHUNK_SIZE * 2),
            input_rate,
            output_rate,
        })
    }

    /// Feed input samples, returning whatever output is ready
    ///
    /// Up to one chunk of input may be held back until enough samples
    /// arrive to fill it.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(input.to_vec());
        };

        self.pending.extend_from_slice(input);

        let mut output = Vec::new();
        while self.pending.len() >= CHUNK_SIZE {
            let rest = self.pending.split_off(CHUNK_SIZE);
            let chunk = std::mem::replace(&mut self.pending, rest);

            let processed = resampler
                .process(&[chunk], None)
                .map_err(|e| VoiceError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&processed[0]);
        }

        Ok(output)
    }

    /// Get the input sample rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Get the output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Drop buffered input and internal filter state
    pub fn reset(&mut self) {
        self.pending.clear();
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resampler_creation() {
        assert!(AudioResampler::new(48000, 16000).is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(AudioResampler::new(0, 16000).is_err());
        assert!(AudioResampler::new(48000, 0).is_err());
    }

    #[test]
    fn test_unity_rate_passthrough() {
        let mut resampler = AudioResampler::new(16000, 16000).unwrap();
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        assert_eq!(resampler.process(&input).unwrap(), input);
    }

    #[test]
    fn test_downsampling_ratio() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        let input: Vec<f32> = (0..48000).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.process(&input).unwrap();

        // One second of input should come out near one second at 16 kHz;
        // allow slack for the chunk held back and filter delay.
        assert!(output.len() > 14000 && output.len() < 17000, "{}", output.len());
    }

    #[test]
    fn test_short_input_is_buffered() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        let output = resampler.process(&[0.0; 100]).unwrap();
        assert!(output.is_empty());
    }
}
