//! # loci-core
//!
//! Core types, traits, and abstractions for the loci geo-note engine.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other loci crates depend on.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, SyncEvent};
pub use models::*;
pub use traits::*;
