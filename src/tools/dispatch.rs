//! Tool dispatch bridge
//!
//! Executes structured intents from the remote model against the note
//! store. The model's argument extraction is not guaranteed reliable, so
//! every field is coerced and defaulted rather than rejected: refusing to
//! save a spoken thought is worse than saving it with best-effort fields.
//!
//! Every invocation produces exactly one result, store failures and
//! unknown tool names included; the remote protocol is violated if a
//! function call is left unanswered.

use crate::notes::{ChecklistItem, Note, NoteFields, NoteStore, NoteType};
use crate::tools::schema::{APPEND_TO_MEMORY, SAVE_TO_MEMORY};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const SAVE_OK: &str = "Saved to Cortex successfully.";
const SAVE_FAILED: &str = "Failed to save to Cortex.";
const APPEND_FAILED: &str = "Failed to update Cortex.";

/// A named capability request from the remote model
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Correlation identifier the reply must carry
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// The single reply owed for each invocation
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub id: String,
    pub name: String,
    pub result: String,
}

/// Bridge between remote tool calls and the note store
pub struct ToolDispatcher {
    store: Arc<dyn NoteStore>,
}

impl ToolDispatcher {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Execute one invocation, always producing a result
    pub async fn dispatch(&self, invocation: ToolInvocation) -> ToolResult {
        debug!("Dispatching tool call: {}", invocation.name);

        let result = match invocation.name.as_str() {
            SAVE_TO_MEMORY => self.save_to_memory(&invocation.args).await,
            APPEND_TO_MEMORY => self.append_to_memory(&invocation.args).await,
            other => {
                warn!("Remote requested unknown tool: {}", other);
                format!("Tool '{}' is not supported.", other)
            }
        };

        ToolResult {
            id: invocation.id,
            name: invocation.name,
            result,
        }
    }

    async fn save_to_memory(&self, args: &Value) -> String {
        let note = note_from_args(args);
        match self.store.create(note).await {
            Ok(_) => SAVE_OK.to_string(),
            Err(e) => {
                warn!("Failed to save via voice: {}", e);
                SAVE_FAILED.to_string()
            }
        }
    }

    async fn append_to_memory(&self, args: &Value) -> String {
        let target_title = string_arg(args, "target_title").unwrap_or_default();
        let content = string_arg(args, "content");
        let items = items_arg(args);

        let notes = match self.store.list().await {
            Ok(notes) => notes,
            Err(e) => {
                warn!("Failed to list notes for append: {}", e);
                return APPEND_FAILED.to_string();
            }
        };

        // First case-insensitive substring match wins; similarly titled
        // notes are not disambiguated further.
        let needle = target_title.to_lowercase();
        let existing = notes
            .iter()
            .find(|note| !needle.is_empty() && note.title.to_lowercase().contains(&needle));

        let Some(existing) = existing else {
            // Nothing matched: the utterance still gets saved, as a new
            // note carrying the requested title.
            let note = Note::new(
                NoteType::parse_or_default(string_arg(args, "type").as_deref()),
                target_title,
                content.unwrap_or_default(),
            )
            .with_tags(tags_arg(args))
            .with_items(items);
            return match self.store.create(note).await {
                Ok(_) => SAVE_OK.to_string(),
                Err(e) => {
                    warn!("Failed to save via voice: {}", e);
                    SAVE_FAILED.to_string()
                }
            };
        };

        let mut fields = NoteFields::default();
        if let Some(new_content) = content {
            // An empty note takes the new content as-is, no leading
            // newline.
            fields.content = Some(if existing.content.is_empty() {
                new_content
            } else {
                format!("{}\n{}", existing.content, new_content)
            });
        }
        if !items.is_empty() {
            let mut merged = existing.items.clone();
            merged.extend(items);
            fields.items = Some(merged);
        }

        let title = existing.title.clone();
        match self.store.update(existing.id, fields).await {
            Ok(_) => format!("Updated '{}' successfully.", title),
            Err(e) => {
                warn!("Failed to update via voice: {}", e);
                APPEND_FAILED.to_string()
            }
        }
    }
}

/// Build a note from `save_to_memory` arguments, defaulting every field
fn note_from_args(args: &Value) -> Note {
    Note::new(
        NoteType::parse_or_default(string_arg(args, "type").as_deref()),
        string_arg(args, "title").unwrap_or_default(),
        string_arg(args, "content").unwrap_or_default(),
    )
    .with_tags(tags_arg(args))
    .with_items(items_arg(args))
    .with_reminder(reminder_arg(args))
}

fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn tags_arg(args: &Value) -> Vec<String> {
    let tags: Vec<String> = args
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if tags.is_empty() {
        vec!["General".to_string()]
    } else {
        tags
    }
}

/// Checklist items from the arguments; ids are always freshly generated,
/// never taken from the remote.
fn items_arg(args: &Value) -> Vec<ChecklistItem> {
    args.get("items")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .map(|item| {
                    let text = item
                        .get("text")
                        .and_then(|t| t.as_str())
                        .unwrap_or_default();
                    let completed = item
                        .get("completed")
                        .and_then(|c| c.as_bool())
                        .unwrap_or(false);
                    ChecklistItem::new(text, completed)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn reminder_arg(args: &Value) -> Option<DateTime<Utc>> {
    let millis = args.get("reminder_time")?.as_i64()?;
    Utc.timestamp_millis_opt(millis).single()
}
