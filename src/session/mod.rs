pub mod machine;
pub mod supervisor;
pub mod transport;
pub mod wire;

pub use machine::SessionState;
pub use supervisor::{UiEvent, VoiceSupervisor};
