//! End-to-end tool dispatch flows against an in-memory store

use cortex_voice::notes::{ChecklistItem, InMemoryNoteStore, Note, NoteStore, NoteType};
use cortex_voice::tools::{ToolDispatcher, ToolInvocation};
use serde_json::json;
use std::sync::Arc;

fn dispatcher() -> (Arc<InMemoryNoteStore>, ToolDispatcher) {
    let store = Arc::new(InMemoryNoteStore::new());
    let dispatcher = ToolDispatcher::new(store.clone());
    (store, dispatcher)
}

fn invocation(id: &str, name: &str, args: serde_json::Value) -> ToolInvocation {
    ToolInvocation {
        id: id.to_string(),
        name: name.to_string(),
        args,
    }
}

#[tokio::test]
async fn save_creates_note_with_all_fields() {
    let (store, dispatcher) = dispatcher();

    let result = dispatcher
        .dispatch(invocation(
            "fc-1",
            "save_to_memory",
            json!({
                "type": "checklist",
                "title": "Shopping",
                "content": "Weekend groceries",
                "tags": ["Personal"],
                "items": [
                    { "text": "Milk", "completed": false },
                    { "text": "Eggs", "completed": true }
                ]
            }),
        ))
        .await;

    assert_eq!(result.id, "fc-1");
    assert_eq!(result.name, "save_to_memory");
    assert_eq!(result.result, "Saved to Cortex successfully.");

    let notes = store.list().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].note_type, NoteType::Checklist);
    assert_eq!(notes[0].title, "Shopping");
    assert_eq!(notes[0].tags, vec!["Personal".to_string()]);
    assert_eq!(notes[0].items.len(), 2);
    assert!(notes[0].items[1].completed);
}

#[tokio::test]
async fn save_with_sparse_args_gets_defaults() {
    let (store, dispatcher) = dispatcher();

    let result = dispatcher
        .dispatch(invocation(
            "fc-2",
            "save_to_memory",
            json!({ "content": "call the dentist" }),
        ))
        .await;

    assert_eq!(result.result, "Saved to Cortex successfully.");

    let notes = store.list().await.unwrap();
    assert_eq!(notes[0].note_type, NoteType::Note);
    assert_eq!(notes[0].tags, vec!["General".to_string()]);
    assert_eq!(notes[0].content, "call the dentist");
}

#[tokio::test]
async fn save_with_reminder_timestamp() {
    let (store, dispatcher) = dispatcher();

    dispatcher
        .dispatch(invocation(
            "fc-3",
            "save_to_memory",
            json!({
                "type": "reminder",
                "title": "Standup",
                "content": "daily standup",
                "reminder_time": 1_735_689_600_000i64
            }),
        ))
        .await;

    let notes = store.list().await.unwrap();
    assert_eq!(notes[0].note_type, NoteType::Reminder);
    let reminder = notes[0].reminder_at.unwrap();
    assert_eq!(reminder.timestamp_millis(), 1_735_689_600_000);
}

#[tokio::test]
async fn append_matches_title_case_insensitively() {
    let (store, dispatcher) = dispatcher();
    store
        .create(Note::new(NoteType::Note, "Grocery List", "milk"))
        .await
        .unwrap();

    let result = dispatcher
        .dispatch(invocation(
            "fc-4",
            "append_to_memory",
            json!({ "target_title": "grocery", "content": "eggs" }),
        ))
        .await;

    assert_eq!(result.result, "Updated 'Grocery List' successfully.");

    let notes = store.list().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "milk\neggs");
}

#[tokio::test]
async fn append_to_empty_note_takes_content_without_leading_newline() {
    let (store, dispatcher) = dispatcher();
    store
        .create(Note::new(NoteType::Checklist, "Packing", ""))
        .await
        .unwrap();

    dispatcher
        .dispatch(invocation(
            "fc-10",
            "append_to_memory",
            json!({ "target_title": "Packing", "content": "socks" }),
        ))
        .await;

    let notes = store.list().await.unwrap();
    assert_eq!(notes[0].content, "socks");
}

#[tokio::test]
async fn append_merges_checklist_items() {
    let (store, dispatcher) = dispatcher();
    store
        .create(
            Note::new(NoteType::Checklist, "Packing", "")
                .with_items(vec![ChecklistItem::new("Passport", false)]),
        )
        .await
        .unwrap();

    dispatcher
        .dispatch(invocation(
            "fc-5",
            "append_to_memory",
            json!({
                "target_title": "Packing",
                "items": [{ "text": "Charger" }]
            }),
        ))
        .await;

    let notes = store.list().await.unwrap();
    assert_eq!(notes[0].items.len(), 2);
    assert_eq!(notes[0].items[0].text, "Passport");
    assert_eq!(notes[0].items[1].text, "Charger");
    assert_ne!(notes[0].items[0].id, notes[0].items[1].id);
}

#[tokio::test]
async fn remote_supplied_item_ids_are_never_trusted() {
    let (store, dispatcher) = dispatcher();
    let forged = "11111111-1111-1111-1111-111111111111";

    dispatcher
        .dispatch(invocation(
            "fc-9",
            "save_to_memory",
            json!({
                "type": "checklist",
                "title": "Chores",
                "items": [
                    { "id": forged, "text": "Laundry" },
                    { "id": forged, "text": "Dishes" }
                ]
            }),
        ))
        .await;

    let notes = store.list().await.unwrap();
    let items = &notes[0].items;
    assert_ne!(items[0].id.to_string(), forged);
    assert_ne!(items[1].id.to_string(), forged);
    assert_ne!(items[0].id, items[1].id);
}

#[tokio::test]
async fn append_without_match_creates_new_note() {
    let (store, dispatcher) = dispatcher();

    let result = dispatcher
        .dispatch(invocation(
            "fc-6",
            "append_to_memory",
            json!({ "target_title": "Trip ideas", "content": "visit Lisbon" }),
        ))
        .await;

    assert_eq!(result.result, "Saved to Cortex successfully.");

    let notes = store.list().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Trip ideas");
    assert_eq!(notes[0].content, "visit Lisbon");
}

#[tokio::test]
async fn first_matching_title_wins() {
    let (store, dispatcher) = dispatcher();
    store
        .create(Note::new(NoteType::Note, "Work log", "monday"))
        .await
        .unwrap();
    store
        .create(Note::new(NoteType::Note, "Work log 2", "tuesday"))
        .await
        .unwrap();

    dispatcher
        .dispatch(invocation(
            "fc-7",
            "append_to_memory",
            json!({ "target_title": "work log", "content": "wednesday" }),
        ))
        .await;

    let notes = store.list().await.unwrap();
    assert_eq!(notes[0].content, "monday\nwednesday");
    assert_eq!(notes[1].content, "tuesday");
}

#[tokio::test]
async fn unknown_tool_still_gets_a_reply() {
    let (store, dispatcher) = dispatcher();

    let result = dispatcher
        .dispatch(invocation("fc-8", "delete_everything", json!({})))
        .await;

    assert_eq!(result.id, "fc-8");
    assert_eq!(result.result, "Tool 'delete_everything' is not supported.");
    assert!(store.is_empty());
}
