pub mod audio;
pub mod config;
pub mod notes;
pub mod session;
pub mod tools;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VoiceError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Codec error: {0}")]
    CodecError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Note store error: {0}")]
    NoteStoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for VoiceError {
    fn from(e: std::io::Error) -> Self {
        VoiceError::TransportError(e.to_string())
    }
}

impl VoiceError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            VoiceError::AudioDeviceError(_) => false,
            VoiceError::AudioProcessingError(_) => true,
            VoiceError::CodecError(_) => true,
            // A dropped connection requires a fresh session
            VoiceError::TransportError(_) => false,
            VoiceError::SessionError(_) => true,
            VoiceError::NoteStoreError(_) => true,
            VoiceError::ConfigError(_) => false,
            VoiceError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            VoiceError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            VoiceError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            VoiceError::CodecError(_) => {
                "Audio data could not be decoded. Please try again.".to_string()
            }
            VoiceError::TransportError(_) => {
                "Connection to the voice service was lost. Please restart the session.".to_string()
            }
            VoiceError::SessionError(_) => {
                "Voice session error occurred. Please try again.".to_string()
            }
            VoiceError::NoteStoreError(_) => {
                "Failed to reach your notes. Please try again.".to_string()
            }
            VoiceError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            VoiceError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, VoiceError>;
