//! Structured logging schema and field name constants for loci.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Lost data or a broken invariant, requires attention |
//! | WARN  | Degraded but recovered (fail-closed verdicts, reload failures, corrupt state files) |
//! | INFO  | Lifecycle events (channel connected, cache replaced, shutdown) |
//! | DEBUG | Decision points, per-operation detail (queries issued, verdicts, distances) |
//! | TRACE | Unused |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "store", "sync", "spatial", "moderation", "geocode", "engine"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "note_store", "sync_channel", "classifier", "debounce"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "load_all", "create", "delete", "nearby", "validate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Owner identifier of the session or note.
pub const OWNER_ID: &str = "owner_id";

/// Geocoder query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query or reload.
pub const RESULT_COUNT: &str = "result_count";

/// Great-circle distance in kilometers.
pub const DISTANCE_KM: &str = "distance_km";

/// Query radius in kilometers.
pub const RADIUS_KM: &str = "radius_km";

// ─── Sync fields ───────────────────────────────────────────────────────────

/// Change-feed event type ("insert", "update", "delete").
pub const EVENT_TYPE: &str = "event_type";

/// Reconnect attempt number since the last successful subscription.
pub const ATTEMPT: &str = "attempt";

/// Backoff delay before the next reconnect, in milliseconds.
pub const BACKOFF_MS: &str = "backoff_ms";

// ─── Moderation fields ─────────────────────────────────────────────────────

/// Classifier model name.
pub const MODEL: &str = "model";

/// Moderation verdict ("allowed", "rejected").
pub const VERDICT: &str = "verdict";

/// User-facing rejection reason.
pub const REASON: &str = "reason";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
