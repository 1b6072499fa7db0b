//! Session supervisor
//!
//! Owns at most one live session at a time and exposes the toggle/stop
//! surface a frontend drives. The session itself runs on its own thread
//! (see [`super::machine`]); the supervisor holds the stop handle and
//! the shared observable state.

use crate::audio::LevelMeter;
use crate::config::VoiceConfig;
use crate::notes::NoteStore;
use crate::session::machine::{self, SessionShared, SessionState};
use crate::tools::ToolDispatcher;
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Notifications for a frontend
#[derive(Debug, Clone)]
pub enum UiEvent {
    StateChanged(SessionState),
    Transcript(String),
    Error(String),
}

struct SessionControl {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Single-session supervisor
pub struct VoiceSupervisor {
    config: VoiceConfig,
    dispatcher: Arc<ToolDispatcher>,
    meter: LevelMeter,
    shared: SessionShared,
    events_rx: Receiver<UiEvent>,
    control: Mutex<SessionControl>,
}

impl VoiceSupervisor {
    pub fn new(config: VoiceConfig, store: Arc<dyn NoteStore>) -> Self {
        let (events_tx, events_rx) = unbounded();
        let meter = LevelMeter::new(config.analysis_window);
        Self {
            config,
            dispatcher: Arc::new(ToolDispatcher::new(store)),
            meter,
            shared: SessionShared::new(events_tx),
            events_rx,
            control: Mutex::new(SessionControl {
                stop_tx: None,
                handle: None,
            }),
        }
    }

    /// Start a session if none is active, otherwise stop the active one
    pub fn toggle(&self) {
        let mut control = self.control.lock();

        if control.stop_tx.is_some() && self.shared.state().is_active() {
            info!("Toggle: stopping active session");
            Self::stop_locked(&mut control);
            return;
        }

        // Reap a finished session thread before starting a fresh one.
        control.stop_tx = None;
        if let Some(handle) = control.handle.take() {
            let _ = handle.join();
        }

        if !self.shared.state().can_start() {
            warn!("Toggle ignored, session is {:?}", self.shared.state());
            return;
        }

        info!("Toggle: starting session");
        // Transition before spawning so an immediate second toggle sees
        // an active session.
        self.shared.set_state(SessionState::Connecting);

        let (stop_tx, stop_rx) = oneshot::channel();
        let config = self.config.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let meter = self.meter.clone();
        let shared = self.shared.clone();

        let handle = std::thread::spawn(move || {
            machine::run_blocking(config, dispatcher, meter, shared, stop_rx);
        });

        control.stop_tx = Some(stop_tx);
        control.handle = Some(handle);
    }

    /// Stop the active session; no-op when none is running
    pub fn stop(&self) {
        let mut control = self.control.lock();
        Self::stop_locked(&mut control);
    }

    fn stop_locked(control: &mut SessionControl) {
        if let Some(stop_tx) = control.stop_tx.take() {
            // The session may have already finished on its own.
            if stop_tx.send(()).is_err() {
                debug!("Session was already gone at stop");
            }
        }
        if let Some(handle) = control.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Current-utterance transcript, empty between utterances
    pub fn transcript(&self) -> String {
        self.shared.transcript()
    }

    /// Whether the session is open and consuming microphone audio
    pub fn is_listening(&self) -> bool {
        self.shared.state() == SessionState::Open
    }

    /// Smoothed microphone level in `0.0..=1.0`
    pub fn voice_level(&self) -> f32 {
        self.meter.level()
    }

    /// Drain one pending notification, if any
    pub fn try_recv_event(&self) -> Option<UiEvent> {
        self.events_rx.try_recv().ok()
    }
}

impl Drop for VoiceSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}
