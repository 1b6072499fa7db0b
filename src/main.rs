use anyhow::Result;
use cortex_voice::config::VoiceConfig;
use cortex_voice::notes::{InMemoryNoteStore, NoteStore};
use cortex_voice::session::{UiEvent, VoiceSupervisor};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cortex_voice=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cortex voice session");

    let config = VoiceConfig::from_env();
    if config.api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; the live endpoint will reject the session");
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let store: Arc<dyn NoteStore> = Arc::new(InMemoryNoteStore::new());
    let supervisor = VoiceSupervisor::new(config, Arc::clone(&store));

    supervisor.toggle();
    info!("Session starting; press Ctrl+C to stop");

    let mut poll = tokio::time::interval(Duration::from_millis(50));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            _ = poll.tick() => {
                while let Some(event) = supervisor.try_recv_event() {
                    match event {
                        UiEvent::StateChanged(state) => info!("Session state: {:?}", state),
                        UiEvent::Transcript(text) if !text.is_empty() => {
                            info!("Heard: {}", text);
                        }
                        UiEvent::Transcript(_) => {}
                        UiEvent::Error(message) => error!("{}", message),
                    }
                }
                // The session may end on its own (remote close or error).
                if !supervisor.state().is_active() && supervisor.state().can_start() {
                    break;
                }
            }
        }
    }

    supervisor.stop();

    let notes = store.list().await.unwrap_or_default();
    if !notes.is_empty() {
        info!("Captured {} note(s) this session:", notes.len());
        for note in &notes {
            info!("  [{:?}] {}", note.note_type, note.title);
        }
    }

    Ok(())
}
