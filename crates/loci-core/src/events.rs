//! Sync event types and event bus for realtime notifications.
//!
//! The realtime sync channel reports its lifecycle and every applied
//! change through a single broadcast bus. Downstream consumers (the
//! embedding UI, tests, telemetry) subscribe independently.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::traits::ChangeEventType;

/// Lifecycle and change notifications emitted by the realtime sync channel.
///
/// Serialized as JSON with a `type` tag field, e.g.:
/// `{"type":"ChangeApplied","event_type":"insert","note_count":12}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    /// The change feed subscription is established.
    Connected,
    /// A change notification arrived and the full reload completed.
    ChangeApplied {
        event_type: ChangeEventType,
        /// Cache size after the reload.
        note_count: usize,
    },
    /// A change notification arrived but the reload failed; the cache
    /// keeps its previous snapshot and the next event retries.
    ReloadFailed { error: String },
    /// The feed dropped; a resubscribe is scheduled.
    Reconnecting { attempt: u32, delay_ms: u64 },
    /// The feed ended or errored out.
    Disconnected { reason: String },
    /// The channel shut down and released its subscription.
    Stopped,
}

impl SyncEvent {
    /// Returns the event type name for logging and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::Connected => "Connected",
            SyncEvent::ChangeApplied { .. } => "ChangeApplied",
            SyncEvent::ReloadFailed { .. } => "ReloadFailed",
            SyncEvent::Reconnecting { .. } => "Reconnecting",
            SyncEvent::Disconnected { .. } => "Disconnected",
            SyncEvent::Stopped => "Stopped",
        }
    }
}

/// Broadcast-based event bus distributing sync events to multiple consumers.
///
/// Uses `tokio::sync::broadcast` with a configurable buffer size. Slow
/// receivers that fall behind will receive a `Lagged` error and miss
/// events — freshness matters more than completeness for realtime streams.
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    ///
    /// Recommended: [`crate::defaults::EVENT_BUS_CAPACITY`] for production,
    /// 32 for tests.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub fn emit(&self, event: SyncEvent) {
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = event.event_type(),
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events. Each subscriber gets its own
    /// independent stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
