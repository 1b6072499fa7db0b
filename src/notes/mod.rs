pub mod store;
pub mod types;

pub use store::{InMemoryNoteStore, NoteFields, NoteStore};
pub use types::{ChecklistItem, Note, NoteType};
