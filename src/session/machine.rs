//! Session state machine and duplex run loop
//!
//! One live session runs on a dedicated thread with its own
//! current-thread runtime, because the audio pipelines own OS stream
//! handles that must not cross threads. The loop multiplexes outbound
//! microphone frames, inbound server envelopes, tool results, and the
//! supervisor's stop signal.

use crate::audio::{decode_frame, LevelMeter, PlaybackScheduler};
#[cfg(feature = "audio-io")]
use crate::audio::{CapturePipeline, PlaybackPipeline};
use crate::config::VoiceConfig;
use crate::session::transport::Transport;
use crate::session::wire::{self, ServerEvent};
use crate::tools::ToolDispatcher;
use crate::VoiceError;
use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::supervisor::UiEvent;

/// Lifecycle of one voice session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
    Errored,
}

impl SessionState {
    /// A session exists and has not begun shutting down
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Open)
    }

    /// A new session may be started from this state
    pub fn can_start(&self) -> bool {
        matches!(
            self,
            SessionState::Idle | SessionState::Closed | SessionState::Errored
        )
    }
}

struct SharedInner {
    state: SessionState,
    transcript: String,
}

/// State observable from outside the session thread
///
/// Writes also emit [`UiEvent`]s so a frontend can react without
/// polling. A dropped event receiver is tolerated.
#[derive(Clone)]
pub struct SessionShared {
    inner: Arc<RwLock<SharedInner>>,
    events_tx: Sender<UiEvent>,
}

impl SessionShared {
    pub fn new(events_tx: Sender<UiEvent>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SharedInner {
                state: SessionState::Idle,
                transcript: String::new(),
            })),
            events_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.read().state
    }

    pub fn transcript(&self) -> String {
        self.inner.read().transcript.clone()
    }

    pub fn set_state(&self, state: SessionState) {
        {
            let mut inner = self.inner.write();
            if inner.state == state {
                return;
            }
            inner.state = state;
        }
        let _ = self.events_tx.send(UiEvent::StateChanged(state));
    }

    /// Replace the current-utterance transcript
    pub fn set_transcript(&self, text: String) {
        self.inner.write().transcript = text.clone();
        let _ = self.events_tx.send(UiEvent::Transcript(text));
    }

    pub fn report_error(&self, err: &VoiceError) {
        error!("Session error: {}", err);
        let _ = self.events_tx.send(UiEvent::Error(err.user_message()));
    }
}

/// Run one session to completion on the calling thread
pub fn run_blocking(
    config: VoiceConfig,
    dispatcher: Arc<ToolDispatcher>,
    meter: LevelMeter,
    shared: SessionShared,
    stop_rx: oneshot::Receiver<()>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            shared.report_error(&VoiceError::SessionError(format!(
                "Failed to build session runtime: {e}"
            )));
            shared.set_state(SessionState::Errored);
            return;
        }
    };

    runtime.block_on(run(config, dispatcher, meter, shared, stop_rx));
}

async fn run(
    config: VoiceConfig,
    dispatcher: Arc<ToolDispatcher>,
    meter: LevelMeter,
    shared: SessionShared,
    mut stop_rx: oneshot::Receiver<()>,
) {
    #[cfg(not(feature = "audio-io"))]
    let _ = &meter;

    let scheduler = Arc::new(Mutex::new(PlaybackScheduler::new(
        config.playback_sample_rate,
    )));

    // Acquire devices before dialing so hardware failures surface fast.
    #[cfg(feature = "audio-io")]
    let mut capture = if config.enable_audio_input {
        match CapturePipeline::new(meter.clone()) {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                shared.report_error(&e);
                shared.set_state(SessionState::Errored);
                return;
            }
        }
    } else {
        None
    };

    #[cfg(feature = "audio-io")]
    let mut playback = if config.enable_audio_output {
        let mut pipeline = match PlaybackPipeline::new(config.playback_sample_rate) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                shared.report_error(&e);
                shared.set_state(SessionState::Errored);
                return;
            }
        };
        if let Err(e) = pipeline.start(Arc::clone(&scheduler)) {
            shared.report_error(&e);
            shared.set_state(SessionState::Errored);
            return;
        }
        Some(pipeline)
    } else {
        None
    };

    #[cfg(feature = "audio-io")]
    let sink_running = playback.is_some();
    #[cfg(not(feature = "audio-io"))]
    let sink_running = false;

    // The dial races the stop signal so a hung handshake (remote accepts
    // TCP but never answers the upgrade) still yields to stop().
    let connect = tokio::select! {
        result = Transport::connect(&config) => Some(result),
        _ = &mut stop_rx => None,
    };
    let mut transport = match connect {
        Some(Ok(transport)) => transport,
        Some(Err(e)) => {
            shared.report_error(&e);
            #[cfg(feature = "audio-io")]
            {
                if let Some(pipeline) = playback.as_mut() {
                    pipeline.stop();
                }
                drop(capture);
            }
            shared.set_state(SessionState::Errored);
            return;
        }
        None => {
            info!("Session stop requested during connect");
            #[cfg(feature = "audio-io")]
            {
                if let Some(pipeline) = playback.as_mut() {
                    pipeline.stop();
                }
                drop(capture);
            }
            shared.set_state(SessionState::Closed);
            return;
        }
    };

    // Outbound microphone frames; capture drops frames when full so a
    // stalled socket cannot back up the audio callback.
    let (frame_tx, mut frame_rx) = mpsc::channel::<String>(64);
    // Completed tool results waiting for a toolResponse reply.
    let (result_tx, mut result_rx) = mpsc::channel::<crate::tools::ToolResult>(16);
    #[cfg(not(feature = "audio-io"))]
    let _ = &frame_tx;

    let mut open = false;
    let mut fatal = false;

    loop {
        tokio::select! {
            _ = &mut stop_rx => {
                info!("Session stop requested");
                shared.set_state(SessionState::Closing);
                break;
            }

            Some(encoded) = frame_rx.recv() => {
                if !open {
                    continue;
                }
                if let Err(e) = transport.send(wire::realtime_audio_message(&encoded)).await {
                    shared.report_error(&e);
                    fatal = true;
                    break;
                }
            }

            Some(result) = result_rx.recv() => {
                debug!("Replying to tool call {} ({})", result.id, result.name);
                if let Err(e) = transport.send(wire::tool_response_message(&result)).await {
                    warn!("Failed to send tool response: {}", e);
                }
            }

            message = transport.next_message() => {
                match message {
                    None => {
                        info!("Remote closed the session");
                        break;
                    }
                    Some(Err(e)) => {
                        shared.report_error(&e);
                        fatal = true;
                        break;
                    }
                    Some(Ok(envelope)) => {
                        for event in envelope.events() {
                            match event {
                                ServerEvent::SetupComplete => {
                                    info!("Session setup complete");
                                    #[cfg(feature = "audio-io")]
                                    if let Some(pipeline) = capture.as_mut() {
                                        if let Err(e) = pipeline.start(
                                            frame_tx.clone(),
                                            config.capture_sample_rate,
                                            config.frame_size,
                                        ) {
                                            shared.report_error(&e);
                                            fatal = true;
                                        }
                                    }
                                    if fatal {
                                        break;
                                    }
                                    open = true;
                                    shared.set_state(SessionState::Open);
                                }
                                ServerEvent::Transcript(text) => {
                                    shared.set_transcript(text);
                                }
                                ServerEvent::Audio(encoded) => {
                                    handle_audio(&encoded, sink_running, &scheduler);
                                }
                                ServerEvent::Interrupted => {
                                    debug!("Model turn interrupted, flushing playback");
                                    scheduler.lock().interrupt();
                                }
                                ServerEvent::ToolCalls(invocations) => {
                                    for invocation in invocations {
                                        let dispatcher = Arc::clone(&dispatcher);
                                        let result_tx = result_tx.clone();
                                        tokio::spawn(async move {
                                            let result = dispatcher.dispatch(invocation).await;
                                            let _ = result_tx.send(result).await;
                                        });
                                    }
                                }
                            }
                        }
                        if fatal {
                            break;
                        }
                    }
                }
            }
        }
    }

    // Teardown, reverse of acquisition order.
    #[cfg(feature = "audio-io")]
    {
        if let Some(pipeline) = capture.as_mut() {
            pipeline.stop();
        }
        if let Some(pipeline) = playback.as_mut() {
            pipeline.stop();
        }
    }
    scheduler.lock().interrupt();
    transport.close().await;
    shared.set_transcript(String::new());
    shared.set_state(if fatal {
        SessionState::Errored
    } else {
        SessionState::Closed
    });
    info!("Session finished");
}

/// Route one inbound audio payload to the scheduler
///
/// Without a running output sink nothing ever renders or retires
/// scheduled frames, so the payload is dropped instead of queued.
fn handle_audio(encoded: &str, sink_running: bool, scheduler: &Mutex<PlaybackScheduler>) {
    if !sink_running {
        debug!("No playback sink, dropping model audio");
        return;
    }
    match decode_frame(encoded) {
        Ok(samples) => {
            scheduler.lock().schedule(samples);
        }
        Err(e) => {
            warn!("Dropping undecodable audio frame: {}", e);
        }
    }
}
