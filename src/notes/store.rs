use super::types::{ChecklistItem, Note};
use crate::{Result, VoiceError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Field-level update for an existing note
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub items: Option<Vec<ChecklistItem>>,
}

/// Contract to the surrounding note application
///
/// The voice core only ever calls `create`, `update`, and `list`;
/// `delete` and `toggle_checklist_item` belong to the UI that shares
/// the store.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create(&self, note: Note) -> Result<Note>;

    async fn update(&self, id: Uuid, fields: NoteFields) -> Result<Note>;

    async fn list(&self) -> Result<Vec<Note>>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn toggle_checklist_item(&self, note_id: Uuid, item_id: Uuid) -> Result<()>;

    /// Case-insensitive substring search over title, content, and tags
    async fn search(&self, query: &str) -> Result<Vec<Note>> {
        let query = query.to_lowercase();
        let notes = self.list().await?;
        Ok(notes
            .into_iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&query)
                    || note.content.to_lowercase().contains(&query)
                    || note.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect())
    }
}

/// In-memory note store for tests and the demo binary
#[derive(Debug, Clone, Default)]
pub struct InMemoryNoteStore {
    notes: Arc<RwLock<Vec<Note>>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.read().is_empty()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn create(&self, note: Note) -> Result<Note> {
        self.notes.write().push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: Uuid, fields: NoteFields) -> Result<Note> {
        let mut notes = self.notes.write();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| VoiceError::NoteStoreError(format!("No note with id {}", id)))?;

        if let Some(title) = fields.title {
            note.title = title;
        }
        if let Some(content) = fields.content {
            note.content = content;
        }
        if let Some(tags) = fields.tags {
            note.tags = tags;
        }
        if let Some(items) = fields.items {
            note.items = items;
        }
        Ok(note.clone())
    }

    async fn list(&self) -> Result<Vec<Note>> {
        Ok(self.notes.read().clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut notes = self.notes.write();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(VoiceError::NoteStoreError(format!("No note with id {}", id)));
        }
        Ok(())
    }

    async fn toggle_checklist_item(&self, note_id: Uuid, item_id: Uuid) -> Result<()> {
        let mut notes = self.notes.write();
        let note = notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| VoiceError::NoteStoreError(format!("No note with id {}", note_id)))?;
        let item = note
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| VoiceError::NoteStoreError(format!("No item with id {}", item_id)))?;
        item.completed = !item.completed;
        Ok(())
    }
}
