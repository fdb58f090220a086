//! In-memory note backend for tests and embedders.
//!
//! Behaves like the remote collection: assigns ids and timestamps on
//! insert, orders listings newest first, and publishes change events on
//! a broadcast channel. Failure flags let tests induce backend errors at
//! any point, which is how the store's rollback paths are exercised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use loci_core::defaults::EVENT_BUS_CAPACITY;
use loci_core::{
    ChangeEvent, ChangeEventType, ChangeFeed, Error, NewNote, Note, NoteBackend, Result,
};

/// In-memory note collection.
#[derive(Clone)]
pub struct MemoryNoteBackend {
    notes: Arc<Mutex<Vec<Note>>>,
    feed_tx: broadcast::Sender<ChangeEvent>,
    fail_lists: Arc<AtomicBool>,
    fail_inserts: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryNoteBackend {
    /// Create an empty collection.
    pub fn new() -> Self {
        let (feed_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            notes: Arc::new(Mutex::new(Vec::new())),
            feed_tx,
            fail_lists: Arc::new(AtomicBool::new(false)),
            fail_inserts: Arc::new(AtomicBool::new(false)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make subsequent `list_notes` calls fail.
    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `insert_note` calls fail.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `delete_note` calls fail.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of notes currently held.
    pub fn note_count(&self) -> usize {
        self.notes.lock().unwrap().len()
    }

    /// Whether a note with this id is currently held.
    pub fn contains(&self, id: Uuid) -> bool {
        self.notes.lock().unwrap().iter().any(|n| n.id == id)
    }

    /// Publish a change event without mutating the collection, as a
    /// backend with concurrent writers would.
    pub fn publish_event(&self, event: ChangeEvent) {
        let _ = self.feed_tx.send(event);
    }

    fn emit(&self, event_type: ChangeEventType) {
        let _ = self.feed_tx.send(ChangeEvent {
            event_type,
            table: "notes".to_string(),
        });
    }
}

impl Default for MemoryNoteBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteBackend for MemoryNoteBackend {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Error::Persistence("induced list failure".to_string()));
        }
        let mut notes = self.notes.lock().unwrap().clone();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Persistence("induced insert failure".to_string()));
        }
        let created = Note {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            text: note.text,
            latitude: note.latitude,
            longitude: note.longitude,
            owner_id: note.owner_id,
        };
        self.notes.lock().unwrap().push(created.clone());
        self.emit(ChangeEventType::Insert);
        Ok(created)
    }

    async fn delete_note(&self, id: Uuid) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Persistence("induced delete failure".to_string()));
        }
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Error::Persistence(format!("note {} not found", id)));
        }
        drop(notes);
        self.emit(ChangeEventType::Delete);
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for MemoryNoteBackend {
    async fn subscribe(&self) -> Result<BoxStream<'static, Result<ChangeEvent>>> {
        let rx = self.feed_tx.subscribe();
        let stream = BroadcastStream::new(rx).filter_map(|result| async move {
            match result {
                Ok(event) => Some(Ok(event)),
                Err(_) => None, // Skip lagged errors
            }
        });
        Ok(Box::pin(stream))
    }
}
