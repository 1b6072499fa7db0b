use crate::audio::{codec, FrameAssembler, LevelMeter, AudioResampler};
use crate::{Result, VoiceError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Microphone capture pipeline
///
/// Acquires the default input device, downmixes to mono in the stream
/// callback, and hands raw buffers to a worker thread that resamples to
/// the wire rate, feeds the level meter, and emits encoded fixed-size
/// frames on the session's outbound path.
///
/// Echo cancellation, noise suppression, and gain control are left to
/// whatever processing the platform applies to the default device; none
/// of them are required for the pipeline to run.
pub struct CapturePipeline {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    worker: Option<JoinHandle<()>>,
    is_capturing: Arc<Mutex<bool>>,
    meter: LevelMeter,
}

impl CapturePipeline {
    /// Create a pipeline on the default input device
    pub fn new(meter: LevelMeter) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| VoiceError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| {
                VoiceError::AudioDeviceError(format!("Failed to get input config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            worker: None,
            is_capturing: Arc::new(Mutex::new(false)),
            meter,
        })
    }

    /// Get the sample rate of the input device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start capturing, forwarding encoded frames to `frame_tx`
    pub fn start(
        &mut self,
        frame_tx: mpsc::Sender<String>,
        wire_rate: u32,
        frame_size: usize,
    ) -> Result<()> {
        if *self.is_capturing.lock() {
            warn!("Already capturing");
            return Ok(());
        }

        let (raw_tx, raw_rx) = bounded::<Vec<f32>>(64);

        let channels = self.config.channels as usize;
        let is_capturing = Arc::clone(&self.is_capturing);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*is_capturing.lock() {
                        return;
                    }

                    // Convert to mono if necessary
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = raw_tx.try_send(samples) {
                        debug!("Failed to send captured audio: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                VoiceError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            VoiceError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        let device_rate = self.config.sample_rate.0;
        let meter = self.meter.clone();
        let worker = std::thread::spawn(move || {
            capture_worker(raw_rx, frame_tx, meter, device_rate, wire_rate, frame_size);
        });

        *self.is_capturing.lock() = true;
        self.stream = Some(stream);
        self.worker = Some(worker);

        info!("Started microphone capture at {} Hz", device_rate);
        Ok(())
    }

    /// Stop capturing and release the device
    pub fn stop(&mut self) {
        *self.is_capturing.lock() = false;

        if let Some(stream) = self.stream.take() {
            // Dropping the stream drops the callback's sender, which ends
            // the worker's receive loop.
            drop(stream);
            info!("Stopped microphone capture");
        }

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        self.meter.reset();
    }

    /// Check if currently capturing
    pub fn is_capturing(&self) -> bool {
        *self.is_capturing.lock()
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_worker(
    raw_rx: Receiver<Vec<f32>>,
    frame_tx: mpsc::Sender<String>,
    meter: LevelMeter,
    device_rate: u32,
    wire_rate: u32,
    frame_size: usize,
) {
    let mut resampler = match AudioResampler::new(device_rate, wire_rate) {
        Ok(r) => r,
        Err(e) => {
            error!("Capture worker could not create resampler: {}", e);
            return;
        }
    };
    let mut framer = FrameAssembler::new(frame_size);

    while let Ok(raw) = raw_rx.recv() {
        let resampled = match resampler.process(&raw) {
            Ok(samples) => samples,
            Err(e) => {
                warn!("Resampling failed, dropping buffer: {}", e);
                continue;
            }
        };

        meter.push(&resampled);

        for frame in framer.push(&resampled) {
            let encoded = codec::encode_frame(&frame);
            if let Err(e) = frame_tx.try_send(encoded) {
                // Outbound path is saturated or closed; drop the frame
                // rather than buffer without bound.
                debug!("Dropping outbound frame: {}", e);
            }
        }
    }

    debug!("Capture worker exited");
}
