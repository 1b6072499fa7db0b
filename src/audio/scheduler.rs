//! Gapless playback scheduling
//!
//! Inbound model audio arrives as variable-length frames with arbitrary
//! jitter. The scheduler keeps a timeline cursor: each new frame starts
//! at `max(cursor, clock)` and advances the cursor by its duration, so
//! frames play back-to-back with no gap and no overlap as long as they
//! arrive before their scheduled start.
//!
//! An interruption (the user talking over the model) stops every live
//! frame immediately and resets the cursor to zero. No fade, no drain.

use tracing::debug;

struct ScheduledFrame {
    /// Timeline position of the first sample, in samples
    start: u64,
    samples: Vec<f32>,
}

/// Playback timeline for one session
///
/// The audio output callback drives the clock by calling `render`; the
/// session loop feeds decoded frames with `schedule`.
pub struct PlaybackScheduler {
    sample_rate: u32,
    /// Samples rendered since the stream opened
    clock: u64,
    /// Timeline position at which the next frame begins, in samples
    next_start: u64,
    /// Scheduled but not yet finished frames
    live: Vec<ScheduledFrame>,
}

impl PlaybackScheduler {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            clock: 0,
            next_start: 0,
            live: Vec::new(),
        }
    }

    /// Current playback clock position in seconds
    pub fn now(&self) -> f64 {
        self.clock as f64 / self.sample_rate as f64
    }

    /// Schedule a decoded frame, returning its start time in seconds
    pub fn schedule(&mut self, samples: Vec<f32>) -> f64 {
        // First frame, or playback fell behind: snap the cursor forward.
        let start = self.next_start.max(self.clock);
        self.next_start = start + samples.len() as u64;

        if !samples.is_empty() {
            self.live.push(ScheduledFrame { start, samples });
        }
        start as f64 / self.sample_rate as f64
    }

    /// Stop everything scheduled and reset the cursor to zero
    pub fn interrupt(&mut self) {
        if !self.live.is_empty() {
            debug!("Interrupted playback, dropping {} frames", self.live.len());
        }
        self.live.clear();
        self.next_start = 0;
    }

    /// Mix scheduled frames into the output buffer and advance the clock
    ///
    /// Regions with no scheduled audio render as silence.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let render_start = self.clock;
        let render_end = render_start + out.len() as u64;

        for frame in &self.live {
            let frame_end = frame.start + frame.samples.len() as u64;
            if frame_end <= render_start || frame.start >= render_end {
                continue;
            }

            let from = frame.start.max(render_start);
            let to = frame_end.min(render_end);
            for position in from..to {
                let src = (position - frame.start) as usize;
                let dst = (position - render_start) as usize;
                out[dst] += frame.samples[src];
            }
        }

        self.clock = render_end;
        self.live
            .retain(|frame| frame.start + frame.samples.len() as u64 > render_end);
    }

    /// Number of scheduled-but-unfinished frames
    pub fn live_frames(&self) -> usize {
        self.live.len()
    }

    /// Whether nothing remains scheduled at or after the current clock
    pub fn is_idle(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 24_000;

    #[test]
    fn test_frames_schedule_back_to_back() {
        let mut scheduler = PlaybackScheduler::new(RATE);

        let durations = [2400usize, 1200, 4800, 600];
        let mut starts = Vec::new();
        for &len in &durations {
            starts.push(scheduler.schedule(vec![0.1; len]));
        }

        for i in 0..durations.len() - 1 {
            let expected = starts[i] + durations[i] as f64 / RATE as f64;
            assert!(
                (starts[i + 1] - expected).abs() < 1e-9,
                "gap or overlap between frame {} and {}",
                i,
                i + 1
            );
        }
    }

    #[test]
    fn test_late_frame_snaps_to_clock() {
        let mut scheduler = PlaybackScheduler::new(RATE);
        scheduler.schedule(vec![0.1; 100]);

        // Render well past the end of the first frame.
        let mut out = vec![0.0; 1000];
        scheduler.render(&mut out);

        let start = scheduler.schedule(vec![0.1; 100]);
        assert!((start - scheduler.now()).abs() < 1e-9);
    }

    #[test]
    fn test_interrupt_clears_frames_and_resets_cursor() {
        let mut scheduler = PlaybackScheduler::new(RATE);
        scheduler.schedule(vec![0.5; 4800]);
        scheduler.schedule(vec![0.5; 4800]);
        assert_eq!(scheduler.live_frames(), 2);

        let mut out = vec![0.0; 240];
        scheduler.render(&mut out);

        scheduler.interrupt();
        assert_eq!(scheduler.live_frames(), 0);

        // The next frame starts at the current clock, not the stale cursor.
        let start = scheduler.schedule(vec![0.5; 100]);
        assert!((start - scheduler.now()).abs() < 1e-9);
        assert!(start > 0.0);
    }

    #[test]
    fn test_render_produces_scheduled_samples() {
        let mut scheduler = PlaybackScheduler::new(RATE);
        scheduler.schedule(vec![0.25; 480]);

        let mut out = vec![0.0; 240];
        scheduler.render(&mut out);
        assert!(out.iter().all(|&s| (s - 0.25).abs() < 1e-6));

        scheduler.render(&mut out);
        assert!(out.iter().all(|&s| (s - 0.25).abs() < 1e-6));

        // Past the frame: silence, and the frame is retired.
        scheduler.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_interrupted_then_rendered_is_silent() {
        let mut scheduler = PlaybackScheduler::new(RATE);
        scheduler.schedule(vec![0.9; 2400]);
        scheduler.interrupt();

        let mut out = vec![1.0; 480];
        scheduler.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
