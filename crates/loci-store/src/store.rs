//! The cached note store.
//!
//! Holds a full snapshot of the note collection and keeps it consistent
//! through full reloads only. There is no incremental patch logic: a
//! reload replaces the whole cache with one internally consistent
//! snapshot, so concurrent reloads are idempotent whatever order they
//! land in.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use loci_core::{Coordinates, NewNote, Note, NoteBackend, Result};

/// Cached view of the remote note collection.
///
/// Cheap to clone; clones share the cache and backend handle.
#[derive(Clone)]
pub struct NoteStore {
    backend: Arc<dyn NoteBackend>,
    cache: Arc<Mutex<Arc<Vec<Note>>>>,
}

impl NoteStore {
    /// Create a store over the given backend with an empty cache.
    pub fn new(backend: Arc<dyn NoteBackend>) -> Self {
        Self {
            backend,
            cache: Arc::new(Mutex::new(Arc::new(Vec::new()))),
        }
    }

    /// Fetch every note from the backend and replace the cache in full.
    ///
    /// Returns the new cache size.
    #[instrument(skip(self), fields(subsystem = "store", op = "load_all"))]
    pub async fn load_all(&self) -> Result<usize> {
        let notes = self.backend.list_notes().await?;
        let count = notes.len();
        *self.cache.lock().await = Arc::new(notes);
        debug!(note_count = count, "Cache replaced");
        Ok(count)
    }

    /// Validate and persist a new note.
    ///
    /// Not optimistic: the cache is untouched until a reload (direct or
    /// push-triggered) observes the insert. On failure the error surfaces
    /// and the cache likewise keeps its previous snapshot.
    #[instrument(skip(self, note), fields(subsystem = "store", op = "create"))]
    pub async fn create(&self, note: NewNote) -> Result<Note> {
        Coordinates::new(note.latitude, note.longitude)?;

        let created = self.backend.insert_note(note).await?;
        debug!(note_id = %created.id, "Note persisted");
        Ok(created)
    }

    /// Delete a note, optimistically dropping it from the cache first.
    ///
    /// On backend failure the cache is restored with a full reload rather
    /// than by re-inserting the removed row, which could resurrect state
    /// a concurrent writer has since changed. If that rollback reload
    /// itself fails, the optimistic removal stays in place and the reload
    /// error surfaces.
    #[instrument(skip(self), fields(subsystem = "store", op = "delete", note_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        {
            let mut cache = self.cache.lock().await;
            let mut notes: Vec<Note> = cache.as_ref().clone();
            notes.retain(|n| n.id != id);
            *cache = Arc::new(notes);
        }

        match self.backend.delete_note(id).await {
            Ok(()) => {
                debug!("Note deleted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Delete failed, reloading to roll back");
                if let Err(reload_err) = self.load_all().await {
                    warn!(
                        error = %reload_err,
                        "Rollback reload failed, cache keeps the removal"
                    );
                    return Err(reload_err);
                }
                Err(e)
            }
        }
    }

    /// Snapshot of the current cache.
    ///
    /// The snapshot is the cache's own Arc, so taking one never copies
    /// note data.
    pub async fn notes(&self) -> Arc<Vec<Note>> {
        self.cache.lock().await.clone()
    }

    /// Number of notes currently cached.
    pub async fn note_count(&self) -> usize {
        self.cache.lock().await.len()
    }
}
