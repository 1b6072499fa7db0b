//! Fixed-size framing stage
//!
//! Slices a continuous mono sample stream into frames of exactly
//! `frame_size` samples; the remainder is carried to the next push.

/// Accumulates samples and emits fixed-size frames
pub struct FrameAssembler {
    frame_size: usize,
    pending: Vec<f32>,
}

impl FrameAssembler {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            pending: Vec::with_capacity(frame_size * 2),
        }
    }

    /// Push samples, returning every completed frame
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.pending.extend_from_slice(samples);

        let mut frames = Vec::new();
        while self.pending.len() >= self.frame_size {
            let rest = self.pending.split_off(self.frame_size);
            frames.push(std::mem::replace(&mut self.pending, rest));
        }
        frames
    }

    /// Number of samples waiting for the next full frame
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any partial frame
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_frame() {
        let mut framer = FrameAssembler::new(4);
        let frames = framer.push(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0, 4.0]]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut framer = FrameAssembler::new(4);
        assert!(framer.push(&[1.0, 2.0, 3.0]).is_empty());
        assert_eq!(framer.pending_len(), 3);

        let frames = framer.push(&[4.0, 5.0]);
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0, 4.0]]);
        assert_eq!(framer.pending_len(), 1);
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut framer = FrameAssembler::new(2);
        let frames = framer.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], vec![3.0, 4.0]);
        assert_eq!(framer.pending_len(), 1);
    }

    #[test]
    fn test_clear_drops_partial() {
        let mut framer = FrameAssembler::new(4);
        framer.push(&[1.0, 2.0]);
        framer.clear();
        assert_eq!(framer.pending_len(), 0);
    }
}
