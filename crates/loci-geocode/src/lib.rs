//! # loci-geocode
//!
//! Location search for loci: a Nominatim-compatible HTTP client, the
//! typeahead debouncer, and the persisted recent-searches list.
//!
//! This crate provides:
//! - Forward search and typeahead suggestions with provider-ranked results
//! - Reverse geocoding with an `"Unknown location"` fallback
//! - Silent degradation to empty results on provider failures
//! - A restart-timer debouncer where only the newest call survives
//! - A move-to-front recent-searches list persisted as JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use loci_geocode::{Debouncer, GeocodeClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GeocodeClient::from_env();
//!     let debouncer = Debouncer::new();
//!     let results = debouncer
//!         .debounce(|| client.search("udaipur"))
//!         .await
//!         .unwrap_or_default();
//!     println!("{} results", results.len());
//! }
//! ```

pub mod client;
pub mod debounce;
pub mod recents;

// Re-export core types
pub use loci_core::*;

pub use client::{GeocodeClient, UNKNOWN_LOCATION};
pub use debounce::Debouncer;
pub use recents::RecentSearches;
