//! # loci-moderation
//!
//! Two-stage note moderation for loci.
//!
//! This crate provides:
//! - Local heuristic gate (length, profanity, spam, gibberish)
//! - Remote chat-completion classifier backend
//! - Validation strategies composing the two stages
//! - Deterministic mock classifier for tests
//! - `modcheck` CLI for running the gate from a shell
//!
//! Every note passes the heuristics first; only text the heuristics allow
//! reaches the classifier. When the classifier is unreachable or replies
//! with something unparseable, the note is rejected rather than allowed
//! through unscreened.
//!
//! # Example
//!
//! ```rust,no_run
//! use loci_moderation::{build_validator, ModerationStrategy};
//!
//! #[tokio::main]
//! async fn main() {
//!     let validator = build_validator(ModerationStrategy::Classified);
//!     let verdict = validator.validate("Lovely sunset view here").await;
//!     assert!(verdict.is_allowed());
//! }
//! ```

pub mod classifier;
pub mod heuristics;
pub mod mock;
pub mod strategy;

// Re-export core types
pub use loci_core::*;

pub use classifier::ChatClassifier;
pub use heuristics::{
    sanitize_for_display, HeuristicGate, REASON_EMPTY, REASON_GIBBERISH, REASON_PROFANITY,
    REASON_SPAM, REASON_TOO_LONG,
};
pub use mock::MockClassifier;
pub use strategy::{
    build_validator, validator_from_env, ClassifiedValidator, HeuristicValidator,
    ModerationStrategy, REASON_CONTENT_POLICY,
};
