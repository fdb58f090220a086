//! Realtime sync channel over the note change feed.
//!
//! Subscribes to the backend's change feed and answers every insert,
//! update, or delete notification on the `notes` table with a full
//! [`NoteStore::load_all`]. No payload diffs are applied; the reload is
//! the only consistency mechanism. When the feed drops, the channel
//! resubscribes with jittered exponential backoff and keeps going until
//! shut down.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use loci_core::defaults::{EVENT_BUS_CAPACITY, RECONNECT_BASE_MS, RECONNECT_MAX_MS};
use loci_core::{ChangeEvent, ChangeFeed, Error, EventBus, Result, SyncEvent};

use crate::store::NoteStore;

/// Handle for controlling a running sync channel.
///
/// Dropping the handle closes the shutdown channel, which ends the task
/// and releases the feed subscription. An explicit [`SyncHandle::shutdown`]
/// does the same but awaits task exit.
pub struct SyncHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<SyncEvent>,
    join: JoinHandle<()>,
}

impl SyncHandle {
    /// Signal the channel to shut down and wait for the task to exit.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Channel("Failed to send shutdown signal".to_string()))?;
        self.join
            .await
            .map_err(|e| Error::Channel(format!("Sync task join failed: {}", e)))?;
        Ok(())
    }

    /// Get a receiver for sync events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_rx.resubscribe()
    }
}

/// The realtime sync channel.
pub struct SyncChannel {
    store: NoteStore,
    feed: Arc<dyn ChangeFeed>,
    events: EventBus,
}

impl SyncChannel {
    /// Create a channel that keeps `store` consistent with `feed`.
    pub fn new(store: NoteStore, feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            store,
            feed,
            events: EventBus::new(EVENT_BUS_CAPACITY),
        }
    }

    /// Get a receiver for sync events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Start the channel and return a handle for control.
    pub fn start(self) -> SyncHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.events.subscribe();

        let join = tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        SyncHandle {
            shutdown_tx,
            event_rx,
            join,
        }
    }

    /// Run the subscribe/consume/resubscribe loop until shut down.
    #[instrument(skip(self, shutdown_rx), fields(subsystem = "store", component = "sync"))]
    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        info!("Sync channel started");

        let mut attempt: u32 = 0;

        'outer: loop {
            match self.feed.subscribe().await {
                Ok(mut stream) => {
                    attempt = 0;
                    info!("Change feed connected");
                    self.events.emit(SyncEvent::Connected);

                    loop {
                        tokio::select! {
                            _ = shutdown_rx.recv() => {
                                info!("Sync channel received shutdown signal");
                                break 'outer;
                            }
                            item = stream.next() => match item {
                                Some(Ok(event)) => self.apply(event).await,
                                Some(Err(e)) => {
                                    warn!(error = %e, "Change feed errored");
                                    self.events.emit(SyncEvent::Disconnected {
                                        reason: e.to_string(),
                                    });
                                    break;
                                }
                                None => {
                                    warn!("Change feed ended");
                                    self.events.emit(SyncEvent::Disconnected {
                                        reason: "stream ended".to_string(),
                                    });
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Change feed subscription failed");
                }
            }

            attempt += 1;
            let delay = backoff_delay(attempt);
            let delay_ms = delay.as_millis() as u64;
            debug!(attempt, delay_ms, "Scheduling resubscribe");
            self.events.emit(SyncEvent::Reconnecting { attempt, delay_ms });

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Sync channel received shutdown signal");
                    break 'outer;
                }
                _ = sleep(delay) => {}
            }
        }

        self.events.emit(SyncEvent::Stopped);
        info!("Sync channel stopped");
    }

    /// React to a single change notification.
    ///
    /// A reload failure does not kill the channel: the event is dropped
    /// and the next one retries.
    async fn apply(&self, event: ChangeEvent) {
        if event.table != "notes" {
            debug!(table = %event.table, "Ignoring change event for other table");
            return;
        }

        debug!(
            event_type = event.event_type.as_str(),
            "Change event received, reloading"
        );
        match self.store.load_all().await {
            Ok(note_count) => {
                self.events.emit(SyncEvent::ChangeApplied {
                    event_type: event.event_type,
                    note_count,
                });
            }
            Err(e) => {
                warn!(error = %e, "Reload after change event failed");
                self.events.emit(SyncEvent::ReloadFailed {
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Compute the jittered backoff delay for a reconnect attempt (1-based).
///
/// Exponential from [`RECONNECT_BASE_MS`], doubling up to the
/// [`RECONNECT_MAX_MS`] cap, then jittered uniformly into [0.5, 1.0) of
/// the computed value.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(6);
    let raw = (RECONNECT_BASE_MS << exp).min(RECONNECT_MAX_MS);
    let jitter: f64 = rand::thread_rng().gen_range(0.5..1.0);
    Duration::from_millis((raw as f64 * jitter) as u64)
}
