//! Tool declarations advertised to the remote model
//!
//! Sent once inside the session setup message so the model knows the
//! shapes it may call back with.

use serde_json::{json, Value};

pub const SAVE_TO_MEMORY: &str = "save_to_memory";
pub const APPEND_TO_MEMORY: &str = "append_to_memory";

/// The `tools` array for the setup message
pub fn tool_declarations() -> Value {
    json!([
        {
            "functionDeclarations": [
                {
                    "name": SAVE_TO_MEMORY,
                    "description": "Save a new note, task, checklist or reminder.",
                    "parameters": {
                        "type": "OBJECT",
                        "properties": {
                            "type": { "type": "STRING" },
                            "title": { "type": "STRING" },
                            "content": { "type": "STRING" },
                            "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                            "items": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "text": { "type": "STRING" },
                                        "completed": { "type": "BOOLEAN" }
                                    }
                                }
                            },
                            "reminder_time": { "type": "NUMBER" }
                        },
                        "required": ["type", "content"]
                    }
                },
                {
                    "name": APPEND_TO_MEMORY,
                    "description": "Append content or checklist items to an existing note found by title.",
                    "parameters": {
                        "type": "OBJECT",
                        "properties": {
                            "target_title": { "type": "STRING" },
                            "content": { "type": "STRING" },
                            "items": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "text": { "type": "STRING" },
                                        "completed": { "type": "BOOLEAN" }
                                    }
                                }
                            }
                        },
                        "required": ["target_title"]
                    }
                }
            ]
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_both_tools() {
        let tools = tool_declarations();
        let declarations = tools[0]["functionDeclarations"].as_array().unwrap();
        let names: Vec<&str> = declarations
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec![SAVE_TO_MEMORY, APPEND_TO_MEMORY]);
    }
}
