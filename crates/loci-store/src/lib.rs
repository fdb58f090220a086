//! # loci-store
//!
//! The cached note store for loci: backends for the persisted note
//! collection, the full-reload cache over them, and the realtime sync
//! channel that keeps the cache consistent with the change feed.
//!
//! This crate provides:
//! - `HttpNoteBackend`, a REST client with an SSE-style change feed
//! - `MemoryNoteBackend` with induced-failure flags for tests and embedders
//! - `NoteStore`, a full-replace cache with optimistic delete and
//!   reload-based rollback
//! - `SyncChannel`, which answers every change notification with a full
//!   reload and resubscribes with jittered exponential backoff
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use loci_store::{HttpNoteBackend, NoteStore, SyncChannel};
//!
//! #[tokio::main]
//! async fn main() -> loci_core::Result<()> {
//!     let backend = Arc::new(HttpNoteBackend::from_env());
//!     let store = NoteStore::new(backend.clone());
//!     store.load_all().await?;
//!
//!     let handle = SyncChannel::new(store.clone(), backend).start();
//!     // ... the cache now follows the backend ...
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod memory;
pub mod store;
pub mod sync;

// Re-export core types
pub use loci_core::*;

pub use backend::HttpNoteBackend;
pub use memory::MemoryNoteBackend;
pub use store::NoteStore;
pub use sync::{SyncChannel, SyncHandle};
