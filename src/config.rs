//! Configuration for the voice session core
//!
//! Provides centralized configuration for the transport, the audio
//! pipelines, and the assistant prompt.

use crate::{Result, VoiceError};

/// Default live endpoint for the remote speech/language model.
pub const DEFAULT_ENDPOINT: &str =
    "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";

/// System instruction shipped with every session.
pub const SYSTEM_INSTRUCTION: &str = "You are \"Cortex\", the user's AI Secondary Mind.\n\
Your primary goal is to help the user record, categorize, and organize their thoughts, tasks, and reminders.\n\
\n\
GUIDELINES:\n\
1. Listen naturally. If the user mentions a task, a note, or a reminder, use the 'save_to_memory' tool.\n\
2. Be concise but helpful in voice responses.\n\
3. Automatically categorize items into 'Work', 'Personal', 'Ideas', etc., based on context.\n\
4. If a user says \"Remind me in X minutes/hours\", calculate the exact reminder timestamp.\n\
\n\
TOOLS:\n\
- save_to_memory(type, content, tags, items?, reminder_time?): Use this for NEW items.\n\
- append_to_memory(target_title, content?, items?): Use this when the user says \"add to X\" or \"update X\".";

/// Configuration for one voice session
#[derive(Clone, Debug)]
pub struct VoiceConfig {
    /// Websocket endpoint of the live model
    pub endpoint: String,

    /// Model identifier sent in the setup message
    pub model: String,

    /// API key appended to the endpoint query string
    pub api_key: String,

    /// System instruction for the assistant
    pub system_instruction: String,

    /// Sample rate of outbound microphone audio
    pub capture_sample_rate: u32,

    /// Sample rate of inbound model audio
    pub playback_sample_rate: u32,

    /// Samples per outbound frame
    pub frame_size: usize,

    /// Samples in the level-meter analysis window
    pub analysis_window: usize,

    /// Whether to open real audio devices
    pub enable_audio_input: bool,
    pub enable_audio_output: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            capture_sample_rate: 16_000,
            playback_sample_rate: 24_000,
            frame_size: 4096,
            analysis_window: 256,
            enable_audio_input: true,
            enable_audio_output: true,
        }
    }
}

impl VoiceConfig {
    /// Build a configuration from the environment
    ///
    /// Reads `GEMINI_API_KEY` (required for a real connection) and
    /// optional `CORTEX_VOICE_ENDPOINT` / `CORTEX_VOICE_MODEL` overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.api_key = key;
        }
        if let Ok(endpoint) = std::env::var("CORTEX_VOICE_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("CORTEX_VOICE_MODEL") {
            config.model = model;
        }
        config
    }

    /// Set the websocket endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system instruction
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Disable audio input (frames must be fed programmatically)
    pub fn without_audio_input(mut self) -> Self {
        self.enable_audio_input = false;
        self
    }

    /// Disable audio output (inbound audio is dropped unrendered)
    pub fn without_audio_output(mut self) -> Self {
        self.enable_audio_output = false;
        self
    }

    /// Full websocket URL including the key
    pub fn session_url(&self) -> String {
        if self.api_key.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}?key={}", self.endpoint, self.api_key)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(VoiceError::ConfigError("Endpoint must not be empty".into()));
        }
        if !self.endpoint.starts_with("ws://") && !self.endpoint.starts_with("wss://") {
            return Err(VoiceError::ConfigError(format!(
                "Endpoint must be a websocket URL: {}",
                self.endpoint
            )));
        }
        if self.frame_size == 0 {
            return Err(VoiceError::ConfigError("Frame size must be non-zero".into()));
        }
        if self.capture_sample_rate == 0 || self.playback_sample_rate == 0 {
            return Err(VoiceError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VoiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capture_sample_rate, 16_000);
        assert_eq!(config.playback_sample_rate, 24_000);
    }

    #[test]
    fn test_session_url_includes_key() {
        let config = VoiceConfig::default().with_api_key("abc");
        assert!(config.session_url().ends_with("?key=abc"));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut config = VoiceConfig::default();
        config.endpoint = "https://example.com".into();
        assert!(config.validate().is_err());
    }
}
