//! Duplex wire envelopes
//!
//! JSON message shapes exchanged with the live model. Outbound messages
//! are built with serializers below; inbound envelopes deserialize into
//! [`ServerMessage`] and flatten into independent [`ServerEvent`]s — one
//! envelope may carry a transcript delta, audio, and tool calls at once.

use crate::config::VoiceConfig;
use crate::tools::{tool_declarations, ToolInvocation, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Mime type declared on outbound microphone chunks
const CAPTURE_MIME: &str = "audio/pcm;rate=16000";

/// Session bootstrap, sent once after the socket opens
pub fn setup_message(config: &VoiceConfig) -> String {
    json!({
        "setup": {
            "model": format!("models/{}", config.model),
            "generationConfig": {
                "responseModalities": ["AUDIO"],
            },
            "systemInstruction": {
                "parts": [{ "text": config.system_instruction }],
            },
            "tools": tool_declarations(),
            "inputAudioTranscription": {},
        }
    })
    .to_string()
}

/// One encoded microphone frame
pub fn realtime_audio_message(encoded_frame: &str) -> String {
    json!({
        "realtimeInput": {
            "mediaChunks": [{
                "mimeType": CAPTURE_MIME,
                "data": encoded_frame,
            }],
        }
    })
    .to_string()
}

/// The reply owed for a tool invocation, keyed by correlation id
pub fn tool_response_message(result: &ToolResult) -> String {
    json!({
        "toolResponse": {
            "functionResponses": [{
                "id": result.id,
                "name": result.name,
                "response": { "result": result.result },
            }],
        }
    })
    .to_string()
}

/// One inbound envelope from the remote model
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerMessage {
    pub setup_complete: Option<Value>,
    pub server_content: Option<ServerContent>,
    pub tool_call: Option<ToolCall>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerContent {
    pub input_transcription: Option<Transcription>,
    pub model_turn: Option<ModelTurn>,
    pub interrupted: Option<bool>,
    pub turn_complete: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Part {
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineData {
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolCall {
    pub function_calls: Vec<FunctionCall>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FunctionCall {
    pub id: Option<String>,
    pub name: String,
    pub args: Value,
}

/// One independent inbound kind, after demultiplexing
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Remote finished session setup; streaming may begin
    SetupComplete,
    /// Current-utterance caption; replaces, never appends
    Transcript(String),
    /// Base64 PCM16 audio for the playback pipeline
    Audio(String),
    /// The user started talking over the model
    Interrupted,
    /// Tool invocations, in array order
    ToolCalls(Vec<ToolInvocation>),
}

impl ServerMessage {
    pub fn parse(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Flatten this envelope into its independent event kinds
    pub fn events(self) -> Vec<ServerEvent> {
        let mut events = Vec::new();

        if self.setup_complete.is_some() {
            events.push(ServerEvent::SetupComplete);
        }

        if let Some(content) = self.server_content {
            if let Some(transcription) = content.input_transcription {
                events.push(ServerEvent::Transcript(transcription.text));
            }
            if let Some(turn) = content.model_turn {
                for part in turn.parts {
                    if let Some(inline) = part.inline_data {
                        if !inline.data.is_empty() {
                            events.push(ServerEvent::Audio(inline.data));
                        }
                    }
                }
            }
            if content.interrupted.unwrap_or(false) {
                events.push(ServerEvent::Interrupted);
            }
        }

        if let Some(tool_call) = self.tool_call {
            let invocations: Vec<ToolInvocation> = tool_call
                .function_calls
                .into_iter()
                .map(|call| ToolInvocation {
                    id: call.id.unwrap_or_default(),
                    name: call.name,
                    args: call.args,
                })
                .collect();
            if !invocations.is_empty() {
                events.push(ServerEvent::ToolCalls(invocations));
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_message_declares_audio_and_tools() {
        let config = VoiceConfig::default();
        let setup: Value = serde_json::from_str(&setup_message(&config)).unwrap();

        assert_eq!(
            setup["setup"]["generationConfig"]["responseModalities"][0],
            "AUDIO"
        );
        assert!(setup["setup"]["tools"][0]["functionDeclarations"].is_array());
        assert!(setup["setup"]["inputAudioTranscription"].is_object());
        assert!(setup["setup"]["model"]
            .as_str()
            .unwrap()
            .starts_with("models/"));
    }

    #[test]
    fn test_realtime_audio_message_shape() {
        let msg: Value = serde_json::from_str(&realtime_audio_message("AAAA")).unwrap();
        let chunk = &msg["realtimeInput"]["mediaChunks"][0];
        assert_eq!(chunk["mimeType"], "audio/pcm;rate=16000");
        assert_eq!(chunk["data"], "AAAA");
    }

    #[test]
    fn test_tool_response_carries_correlation_id() {
        let result = ToolResult {
            id: "fc-7".into(),
            name: "save_to_memory".into(),
            result: "ok".into(),
        };
        let msg: Value = serde_json::from_str(&tool_response_message(&result)).unwrap();
        let response = &msg["toolResponse"]["functionResponses"][0];
        assert_eq!(response["id"], "fc-7");
        assert_eq!(response["response"]["result"], "ok");
    }

    #[test]
    fn test_mixed_envelope_flattens_to_independent_events() {
        let payload = r#"{
            "serverContent": {
                "inputTranscription": { "text": "buy milk" },
                "modelTurn": { "parts": [{ "inlineData": { "mimeType": "audio/pcm", "data": "AAEC" } }] },
                "interrupted": true
            },
            "toolCall": {
                "functionCalls": [
                    { "id": "fc-1", "name": "save_to_memory", "args": { "content": "milk" } }
                ]
            }
        }"#;

        let events = ServerMessage::parse(payload).unwrap().events();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], ServerEvent::Transcript(t) if t == "buy milk"));
        assert!(matches!(&events[1], ServerEvent::Audio(d) if d == "AAEC"));
        assert!(matches!(events[2], ServerEvent::Interrupted));
        assert!(matches!(&events[3], ServerEvent::ToolCalls(calls) if calls.len() == 1));
    }

    #[test]
    fn test_setup_complete_event() {
        let events = ServerMessage::parse(r#"{ "setupComplete": {} }"#)
            .unwrap()
            .events();
        assert!(matches!(events[0], ServerEvent::SetupComplete));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let events = ServerMessage::parse(r#"{ "usageMetadata": { "tokens": 12 } }"#)
            .unwrap()
            .events();
        assert!(events.is_empty());
    }
}
