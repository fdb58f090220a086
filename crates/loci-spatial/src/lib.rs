//! Spatial queries for geo-anchored notes.
//!
//! Everything here is pure geometry on the mean-radius sphere: great-circle
//! distance, radius filtering with stable ascending sort, and closed display
//! rings for map overlays. No I/O, no async. The store hands in a note
//! snapshot and this crate answers questions about it.

pub mod distance;
pub mod nearby;
pub mod ring;

// Re-export core types
pub use loci_core::*;

pub use distance::haversine_distance_km;
pub use nearby::{nearby, nearby_outcome, NearbyOutcome};
pub use ring::circle_polygon;
