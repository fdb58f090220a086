//! Restart-timer debouncer for typeahead lookups.
//!
//! Each call restarts the window; only the newest call survives it. A
//! superseded call resolves to `None` without running its work, and a
//! result that finishes after a newer call has started is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use loci_core::defaults::DEBOUNCE_MS;

/// Generation-counted debouncer.
///
/// Clones share the same generation counter, so a clone moved into a
/// spawned task still supersedes earlier calls on the original.
#[derive(Clone)]
pub struct Debouncer {
    generation: Arc<AtomicU64>,
    window: Duration,
}

impl Debouncer {
    /// Debouncer with the standard typeahead window.
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(DEBOUNCE_MS))
    }

    /// Debouncer with a custom window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            window,
        }
    }

    /// Wait out the window, then run `work` if no newer call arrived.
    ///
    /// Returns `None` when this call was superseded, either during the
    /// window or while `work` was still in flight.
    pub async fn debounce<F, Fut, T>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.window).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            trace!(generation, "debounced call superseded during window");
            return None;
        }

        let result = work().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            trace!(generation, "debounced result superseded in flight");
            return None;
        }

        Some(result)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================================================
// Tests
// ==========================================================================
