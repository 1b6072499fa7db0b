use crate::audio::PlaybackScheduler;
use crate::{Result, VoiceError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Speaker output pipeline
///
/// Opens the default output device mono at the wire rate so inbound
/// frames render without conversion; the stream callback pulls mixed
/// samples from the shared scheduler.
pub struct PlaybackPipeline {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_playing: Arc<Mutex<bool>>,
}

impl PlaybackPipeline {
    /// Create a pipeline on the default output device at `sample_rate`
    pub fn new(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| VoiceError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            config,
            stream: None,
            is_playing: Arc::new(Mutex::new(false)),
        })
    }

    /// Get the output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start rendering from the shared scheduler
    pub fn start(&mut self, scheduler: Arc<Mutex<PlaybackScheduler>>) -> Result<()> {
        if *self.is_playing.lock() {
            warn!("Already playing");
            return Ok(());
        }

        let is_playing = Arc::clone(&self.is_playing);

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !*is_playing.lock() {
                        data.fill(0.0);
                        return;
                    }
                    scheduler.lock().render(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                VoiceError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            VoiceError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        *self.is_playing.lock() = true;
        self.stream = Some(stream);

        info!("Started audio playback at {} Hz", self.config.sample_rate.0);
        Ok(())
    }

    /// Stop rendering and release the device
    pub fn stop(&mut self) {
        *self.is_playing.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped audio playback");
        }
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        *self.is_playing.lock()
    }
}

impl Drop for PlaybackPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
