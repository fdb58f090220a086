//! Radius-filtered nearby query over the note cache.

use serde::Serialize;
use tracing::debug;

use loci_core::{Coordinates, NearbyResult, Note};

use crate::distance::haversine_distance_km;

/// Outcome of a nearby query that may have no center to search from.
///
/// An embedder toggling "show nearby" with no pin dropped gets
/// [`NearbyOutcome::NoPinSelected`], which is a different situation from
/// a dropped pin with nothing in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NearbyOutcome {
    /// No active pin; there was nothing to search from.
    NoPinSelected,
    /// A search ran; the list may be empty.
    Results { results: Vec<NearbyResult> },
}

impl NearbyOutcome {
    /// The result list, when a search actually ran.
    pub fn results(&self) -> Option<&[NearbyResult]> {
        match self {
            NearbyOutcome::NoPinSelected => None,
            NearbyOutcome::Results { results } => Some(results),
        }
    }
}

/// Notes within `radius_km` of `center`, closest first.
///
/// Filters on great-circle distance, then sorts ascending. The sort is
/// stable: notes at equal distance keep their cache order.
pub fn nearby(notes: &[Note], center: Coordinates, radius_km: f64) -> Vec<NearbyResult> {
    let mut results: Vec<NearbyResult> = notes
        .iter()
        .filter_map(|note| {
            let distance_km = haversine_distance_km(center, note.position());
            (distance_km <= radius_km).then(|| NearbyResult {
                note: note.clone(),
                distance_km,
            })
        })
        .collect();

    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    debug!(
        radius_km,
        candidate_count = notes.len(),
        result_count = results.len(),
        "nearby query complete"
    );

    results
}

/// Nearby query against an optional center.
///
/// `None` means no pin is active and yields the explicit
/// [`NearbyOutcome::NoPinSelected`] rather than an empty list.
pub fn nearby_outcome(
    notes: &[Note],
    center: Option<Coordinates>,
    radius_km: f64,
) -> NearbyOutcome {
    match center {
        None => NearbyOutcome::NoPinSelected,
        Some(center) => NearbyOutcome::Results {
            results: nearby(notes, center, radius_km),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use loci_core::defaults::NEARBY_RADIUS_KM;
    use uuid::Uuid;

    fn note_at(lat: f64, lon: f64, text: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            text: Some(text.to_string()),
            latitude: lat,
            longitude: lon,
            owner_id: "owner-1".to_string(),
        }
    }

    fn center() -> Coordinates {
        Coordinates::new(24.5854, 73.7125).unwrap()
    }

    #[test]
    fn test_nearby_filters_by_radius() {
        let notes = vec![
            note_at(24.5854, 73.7125, "at center"),
            note_at(24.5900, 73.7125, "about half a km north"),
            note_at(24.6854, 73.7125, "about eleven km north"),
        ];

        let results = nearby(&notes, center(), NEARBY_RADIUS_KM);
        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(r.distance_km <= NEARBY_RADIUS_KM);
        }
    }

    #[test]
    fn test_nearby_sorted_ascending() {
        let notes = vec![
            note_at(24.5900, 73.7125, "farther"),
            note_at(24.5860, 73.7125, "nearer"),
            note_at(24.5854, 73.7125, "at center"),
        ];

        let results = nearby(&notes, center(), NEARBY_RADIUS_KM);
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
        assert_eq!(results[0].note.text.as_deref(), Some("at center"));
        assert_eq!(results[0].distance_km, 0.0);
    }

    #[test]
    fn test_nearby_ties_keep_cache_order() {
        // Same coordinates, so identical distance; insertion order decides.
        let first = note_at(24.5860, 73.7125, "first");
        let second = note_at(24.5860, 73.7125, "second");
        let notes = vec![first.clone(), second.clone()];

        let results = nearby(&notes, center(), NEARBY_RADIUS_KM);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].note.id, first.id);
        assert_eq!(results[1].note.id, second.id);
    }

    #[test]
    fn test_nearby_boundary_is_inclusive() {
        // A note exactly on the radius boundary is included.
        let c = center();
        let note = note_at(24.5860, 73.7125, "close");
        let d = haversine_distance_km(c, note.position());

        let results = nearby(std::slice::from_ref(&note), c, d);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_nearby_empty_input() {
        let results = nearby(&[], center(), NEARBY_RADIUS_KM);
        assert!(results.is_empty());
    }

    #[test]
    fn test_nearby_nothing_in_range() {
        let notes = vec![note_at(48.8566, 2.3522, "Paris")];
        let results = nearby(&notes, center(), NEARBY_RADIUS_KM);
        assert!(results.is_empty());
    }

    #[test]
    fn test_outcome_distinguishes_no_pin_from_empty() {
        let notes = vec![note_at(48.8566, 2.3522, "Paris")];

        let no_pin = nearby_outcome(&notes, None, NEARBY_RADIUS_KM);
        assert_eq!(no_pin, NearbyOutcome::NoPinSelected);
        assert!(no_pin.results().is_none());

        let empty = nearby_outcome(&notes, Some(center()), NEARBY_RADIUS_KM);
        assert_eq!(empty, NearbyOutcome::Results { results: vec![] });
        assert_eq!(empty.results(), Some(&[][..]));
    }

    #[test]
    fn test_outcome_serialization_tags() {
        let json = serde_json::to_string(&NearbyOutcome::NoPinSelected).unwrap();
        assert!(json.contains(r#""type":"NoPinSelected"#));

        let json = serde_json::to_string(&NearbyOutcome::Results { results: vec![] }).unwrap();
        assert!(json.contains(r#""type":"Results"#));
    }
}
