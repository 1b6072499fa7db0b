pub mod codec;
pub mod framer;
pub mod level;
pub mod resampler;
pub mod scheduler;

#[cfg(feature = "audio-io")]
pub mod capture;
#[cfg(feature = "audio-io")]
pub mod playback;

pub use codec::{decode_frame, encode_frame, f32_to_pcm16, pcm16_to_f32};
pub use framer::FrameAssembler;
pub use level::LevelMeter;
pub use resampler::AudioResampler;
pub use scheduler::PlaybackScheduler;

#[cfg(feature = "audio-io")]
pub use capture::CapturePipeline;
#[cfg(feature = "audio-io")]
pub use playback::PlaybackPipeline;

/// Sample rate of outbound microphone audio on the wire.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Sample rate of inbound model audio on the wire.
pub const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Samples per outbound microphone frame.
pub const FRAME_SIZE: usize = 4096;

/// Samples in the level-meter analysis window.
pub const ANALYSIS_WINDOW: usize = 256;
