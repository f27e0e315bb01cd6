//! NoteStore — in-memory note collection
//!
//! Holds every note for the lifetime of the process behind a single lock.
//! All reads and writes go through that lock, so handlers running on
//! different threads never observe a half-applied update.

use crate::error::{NoteError, Result};
use crate::validation::{validate_create, validate_update};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use notes_types::{CreateNoteRequest, Note, UpdateNoteRequest};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Notes {
    by_id: HashMap<String, Note>,
    /// Ids in insertion order
    order: Vec<String>,
}

/// Authoritative set of notes. Callers only ever receive clones.
#[derive(Default)]
pub struct NoteStore {
    notes: Mutex<Notes>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notes, oldest first
    pub fn list(&self) -> Vec<Note> {
        let notes = self.notes.lock();
        notes
            .order
            .iter()
            .filter_map(|id| notes.by_id.get(id))
            .cloned()
            .collect()
    }

    /// Validate and store a new note with a fresh id
    pub fn create(&self, req: &CreateNoteRequest) -> Result<Note> {
        let new_note = validate_create(req)?;
        let now = now();

        let mut notes = self.notes.lock();

        let mut id = Uuid::new_v4().to_string();
        while notes.by_id.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let note = Note {
            id: id.clone(),
            title: new_note.title,
            content: new_note.content,
            created_at: now,
            updated_at: now,
        };

        notes.by_id.insert(id.clone(), note.clone());
        notes.order.push(id);

        Ok(note)
    }

    pub fn get(&self, id: &str) -> Result<Note> {
        self.notes
            .lock()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| NoteError::NotFound(id.to_string()))
    }

    /// Overwrite the supplied fields of an existing note.
    ///
    /// An unknown id is reported before the body is looked at. A request
    /// with no fields returns the note untouched.
    pub fn update(&self, id: &str, req: &UpdateNoteRequest) -> Result<Note> {
        let mut notes = self.notes.lock();
        let note = notes
            .by_id
            .get_mut(id)
            .ok_or_else(|| NoteError::NotFound(id.to_string()))?;

        let patch = validate_update(req)?;
        if patch.is_empty() {
            return Ok(note.clone());
        }

        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        note.updated_at = touched(note.updated_at);

        Ok(note.clone())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut notes = self.notes.lock();
        if notes.by_id.remove(id).is_none() {
            return Err(NoteError::NotFound(id.to_string()));
        }
        notes.order.retain(|existing| existing != id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.notes.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current time at the precision notes are serialized with
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A modification time strictly after `previous`
fn touched(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + TimeDelta::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn create(store: &NoteStore, title: &str, content: &str) -> Note {
        store
            .create(&CreateNoteRequest::new(title, content))
            .expect("Failed to create note")
    }

    #[test]
    fn test_create_then_get() {
        let store = NoteStore::new();
        let note = create(&store, "Shopping", "Milk, eggs");

        let fetched = store.get(&note.id).expect("Failed to get note");
        assert_eq!(fetched, note);
        assert_eq!(fetched.title, "Shopping");
        assert_eq!(fetched.content, "Milk, eggs");
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = NoteStore::new();
        let ids: HashSet<String> = (0..50)
            .map(|i| create(&store, &format!("Note {}", i), "body").id)
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn test_invalid_create_adds_nothing() {
        let store = NoteStore::new();
        create(&store, "Keep", "me");

        for req in [
            CreateNoteRequest::new("", "x"),
            CreateNoteRequest::new("x", ""),
            CreateNoteRequest::new("a".repeat(201), "x"),
            CreateNoteRequest::default(),
        ] {
            let result = store.create(&req);
            assert!(matches!(result, Err(NoteError::Validation(_))));
        }

        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let store = NoteStore::new();
        let a = create(&store, "A", "1");
        let b = create(&store, "B", "2");
        let c = create(&store, "C", "3");

        store.delete(&b.id).expect("Failed to delete note");

        let ids: Vec<String> = store.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_get_unknown_id() {
        let store = NoteStore::new();
        let err = store.get("missing").unwrap_err();
        assert!(matches!(err, NoteError::NotFound(ref id) if id == "missing"));
        assert_eq!(err.to_string(), "Note with id 'missing' not found");
    }

    #[test]
    fn test_update_title_only() {
        let store = NoteStore::new();
        let note = create(&store, "Old", "Body stays");

        let updated = store
            .update(&note.id, &UpdateNoteRequest::default().with_title("New"))
            .expect("Failed to update note");

        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "Body stays");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
        assert_eq!(store.get(&note.id).unwrap(), updated);
    }

    #[test]
    fn test_update_same_value_still_touches() {
        let store = NoteStore::new();
        let note = create(&store, "Same", "Body");

        let updated = store
            .update(&note.id, &UpdateNoteRequest::default().with_title("Same"))
            .expect("Failed to update note");

        assert!(updated.updated_at > note.updated_at);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let store = NoteStore::new();
        let note = create(&store, "Title", "Body");

        let unchanged = store
            .update(&note.id, &UpdateNoteRequest::default())
            .expect("Failed to update note");

        assert_eq!(unchanged, note);
        assert_eq!(store.get(&note.id).unwrap(), note);
    }

    #[test]
    fn test_invalid_update_leaves_note_unchanged() {
        let store = NoteStore::new();
        let note = create(&store, "Title", "Body");

        // valid title alongside invalid content must not be applied either
        let req = UpdateNoteRequest::default()
            .with_title("Changed")
            .with_content("");
        let result = store.update(&note.id, &req);

        assert!(matches!(result, Err(NoteError::Validation(_))));
        assert_eq!(store.get(&note.id).unwrap(), note);
    }

    #[test]
    fn test_invalid_title_update_leaves_note_unchanged() {
        let store = NoteStore::new();
        let note = create(&store, "Title", "Body");

        for title in [String::new(), "a".repeat(201)] {
            let result = store.update(&note.id, &UpdateNoteRequest::default().with_title(title));
            assert!(matches!(result, Err(NoteError::Validation(_))));
            assert_eq!(store.get(&note.id).unwrap(), note);
        }
    }

    #[test]
    fn test_update_unknown_id() {
        let store = NoteStore::new();

        for req in [
            UpdateNoteRequest::default(),
            UpdateNoteRequest::default().with_title("x"),
            UpdateNoteRequest::default().with_title(""),
        ] {
            let result = store.update("missing", &req);
            assert!(matches!(result, Err(NoteError::NotFound(_))));
        }
    }

    #[test]
    fn test_delete_twice() {
        let store = NoteStore::new();
        let note = create(&store, "Gone", "soon");

        store.delete(&note.id).expect("Failed to delete note");
        assert!(matches!(store.get(&note.id), Err(NoteError::NotFound(_))));
        assert!(matches!(store.delete(&note.id), Err(NoteError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_creates() {
        let store = Arc::new(NoteStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store
                            .create(&CreateNoteRequest::new(format!("{}-{}", t, i), "body"))
                            .expect("Failed to create note");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(store.len(), 200);
        assert_eq!(store.list().len(), 200);
    }

    #[test]
    fn test_concurrent_mutations_and_reads() {
        let store = Arc::new(NoteStore::new());
        let ids: Vec<String> = (0..20)
            .map(|i| create(&store, &format!("t{}", i), &format!("c{}", i)).id)
            .collect();
        let ids = Arc::new(ids);

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    for round in 0..50 {
                        let id = &ids[(t * 7 + round) % ids.len()];
                        let req = UpdateNoteRequest::default()
                            .with_title(format!("t{}-{}", t, round))
                            .with_content(format!("c{}-{}", t, round));
                        match store.update(id, &req) {
                            Ok(note) => assert!(note.updated_at > note.created_at),
                            Err(e) => assert!(matches!(e, NoteError::NotFound(_))),
                        }
                    }
                    // each writer removes its own slice of notes
                    for id in ids.iter().skip(t).step_by(4).take(2) {
                        store.delete(id).expect("Failed to delete note");
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    for round in 0..100 {
                        for note in store.list() {
                            assert!(note.updated_at >= note.created_at);
                            // title and content are always written together
                            assert_eq!(note.title.get(1..), note.content.get(1..));
                        }
                        if let Ok(note) = store.get(&ids[round % ids.len()]) {
                            assert!(note.updated_at >= note.created_at);
                        }
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(store.len(), 12);
        for note in store.list() {
            assert!(note.updated_at >= note.created_at);
        }
    }
}
