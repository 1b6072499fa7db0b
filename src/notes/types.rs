use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Note,
    Task,
    Checklist,
    Reminder,
}

impl NoteType {
    /// Parse a remote-supplied type string, defaulting to `Note` for
    /// anything absent or unrecognized.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("task") => NoteType::Task,
            Some("checklist") => NoteType::Checklist,
            Some("reminder") => NoteType::Reminder,
            _ => NoteType::Note,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

impl ChecklistItem {
    /// A new item always gets a fresh id, whatever the caller supplied
    pub fn new(text: impl Into<String>, completed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub note_type: NoteType,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub items: Vec<ChecklistItem>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(note_type: NoteType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_type,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            items: Vec::new(),
            reminder_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_items(mut self, items: Vec<ChecklistItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_reminder(mut self, reminder_at: Option<DateTime<Utc>>) -> Self {
        self.reminder_at = reminder_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_type_defaults() {
        assert_eq!(NoteType::parse_or_default(None), NoteType::Note);
        assert_eq!(NoteType::parse_or_default(Some("nonsense")), NoteType::Note);
        assert_eq!(NoteType::parse_or_default(Some("reminder")), NoteType::Reminder);
        assert_eq!(NoteType::parse_or_default(Some("task")), NoteType::Task);
    }

    #[test]
    fn test_checklist_items_get_unique_ids() {
        let a = ChecklistItem::new("one", false);
        let b = ChecklistItem::new("one", false);
        assert_ne!(a.id, b.id);
    }
}
