//! Core data models for the loci engine.
//!
//! These types are shared across all loci crates and represent the
//! domain entities: notes pinned to coordinates, the ephemeral pin
//! itself, and the derived/ephemeral search types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// COORDINATES
// =============================================================================

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Latitude is valid in [-90, 90], longitude in [-180, 180]. Values are
/// validated at construction; an invalid pair never enters the system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create a validated coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::Validation(format!(
                "latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::Validation(format!(
                "longitude {} out of range [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Whether a raw pair would pass [`Coordinates::new`].
    pub fn is_valid(latitude: f64, longitude: f64) -> bool {
        Self::new(latitude, longitude).is_ok()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A persisted note anchored to a coordinate pair.
///
/// Immutable once created: the backend supports insert and delete only,
/// no edit. `text` is optional sanitized plain text of at most 500
/// characters; length and content rules are enforced by the moderation
/// gate before any insert is attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
}

impl Note {
    /// The note's position as a coordinate pair.
    ///
    /// Persisted notes always carry valid coordinates (enforced at create
    /// time), so this conversion cannot fail.
    pub fn position(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

// =============================================================================
// GEOPIN
// =============================================================================

/// The ephemeral dropped pin. Never persisted.
///
/// At most one pin is active at any time; dropping a new one replaces the
/// previous. `marker_ref` is an opaque handle the embedding UI may attach
/// for its own marker object, carried through state transitions untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPin {
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_ref: Option<String>,
}

impl GeoPin {
    /// Pin at the given coordinates, with no marker attached yet.
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            marker_ref: None,
        }
    }

    /// Attach an opaque UI marker handle.
    pub fn with_marker(mut self, marker_ref: impl Into<String>) -> Self {
        self.marker_ref = Some(marker_ref.into());
        self
    }
}

// =============================================================================
// DERIVED QUERY TYPES
// =============================================================================

/// A note paired with its great-circle distance from a query center.
///
/// Produced by the nearby query; recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyResult {
    pub note: Note,
    pub distance_km: f64,
}

// =============================================================================
// GEOCODER TYPES
// =============================================================================

/// A lightweight typeahead suggestion from the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A full geocoder search result, ranked by provider importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub importance: f64,
}

impl SearchResult {
    /// The result's position as a coordinate pair, when in range.
    pub fn position(&self) -> Result<Coordinates> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// One entry in the persisted recent-searches list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublabel: Option<String>,
}

impl RecentSearchEntry {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sublabel: None,
        }
    }

    pub fn with_sublabel(mut self, sublabel: impl Into<String>) -> Self {
        self.sublabel = Some(sublabel.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_valid_range() {
        assert!(Coordinates::new(0.0, 0.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(24.5854, 73.7125).is_ok());
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(90.01, 0.0).is_err());
        assert!(Coordinates::new(-90.01, 0.0).is_err());
        assert!(Coordinates::new(0.0, 180.01).is_err());
        assert!(Coordinates::new(0.0, -180.01).is_err());
    }

    #[test]
    fn coordinates_reject_non_finite() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinates::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn coordinates_rejection_is_validation_error() {
        match Coordinates::new(91.0, 0.0) {
            Err(Error::Validation(msg)) => assert!(msg.contains("latitude")),
            other => panic!("expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn note_position_round_trips() {
        let note = Note {
            id: Uuid::nil(),
            created_at: Utc::now(),
            text: Some("hello".to_string()),
            latitude: 24.5854,
            longitude: 73.7125,
            owner_id: "owner-1".to_string(),
        };
        let pos = note.position();
        assert_eq!(pos.latitude, 24.5854);
        assert_eq!(pos.longitude, 73.7125);
    }

    #[test]
    fn note_serializes_with_expected_field_names() {
        let note = Note {
            id: Uuid::nil(),
            created_at: Utc::now(),
            text: None,
            latitude: 1.0,
            longitude: 2.0,
            owner_id: "o".to_string(),
        };
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains(r#""latitude":1.0"#));
        assert!(json.contains(r#""longitude":2.0"#));
        assert!(json.contains(r#""owner_id":"o"#));
        // text skipped when None
        assert!(!json.contains("text"));
    }

    #[test]
    fn geopin_constructors() {
        let coords = Coordinates::new(10.0, 20.0).unwrap();
        let pin = GeoPin::at(coords);
        assert_eq!(pin.coordinates, coords);
        assert!(pin.marker_ref.is_none());

        let pin = pin.with_marker("marker-7");
        assert_eq!(pin.marker_ref.as_deref(), Some("marker-7"));
    }

    #[test]
    fn search_types_use_type_field_on_the_wire() {
        let suggestion = SearchSuggestion {
            id: "1".to_string(),
            name: "Udaipur".to_string(),
            display_name: "Udaipur, Rajasthan, India".to_string(),
            kind: "city".to_string(),
        };
        let json = serde_json::to_string(&suggestion).unwrap();
        assert!(json.contains(r#""type":"city"#));
        assert!(!json.contains("kind"));
    }

    #[test]
    fn search_result_position_validates() {
        let mut result = SearchResult {
            id: "1".to_string(),
            name: "x".to_string(),
            display_name: "x".to_string(),
            latitude: 24.5854,
            longitude: 73.7125,
            kind: "city".to_string(),
            importance: 0.8,
        };
        assert!(result.position().is_ok());

        result.latitude = 123.0;
        assert!(result.position().is_err());
    }

    #[test]
    fn recent_entry_sublabel_skipped_when_none() {
        let entry = RecentSearchEntry::new("Udaipur");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("sublabel"));

        let entry = entry.with_sublabel("Rajasthan, India");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""sublabel":"Rajasthan, India"#));
    }

    #[test]
    fn coordinates_display_is_compact() {
        let coords = Coordinates::new(24.5854, 73.7125).unwrap();
        assert_eq!(coords.to_string(), "(24.5854, 73.7125)");
    }
}
