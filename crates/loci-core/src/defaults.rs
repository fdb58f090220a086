//! Centralized default constants for the loci engine.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates reference these constants instead of defining their
//! own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// SPATIAL
// =============================================================================

/// Mean Earth radius in kilometers, used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in meters, used by the destination-point formula
/// when generating display circles.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default nearby-search radius in kilometers.
pub const NEARBY_RADIUS_KM: f64 = 1.0;

/// Default number of perimeter points for a display circle. The generated
/// ring carries one extra closing point, so 64 yields 65 vertices.
pub const CIRCLE_POINTS: usize = 64;

/// Minimum perimeter points for a display circle; fewer cannot enclose
/// an area.
pub const CIRCLE_POINTS_MIN: usize = 3;

/// Default viewport center latitude (Udaipur) for embedders with no
/// saved viewport.
pub const VIEWPORT_CENTER_LAT: f64 = 24.5854;

/// Default viewport center longitude (Udaipur).
pub const VIEWPORT_CENTER_LON: f64 = 73.7125;

// =============================================================================
// MODERATION
// =============================================================================

/// Maximum note length in characters (Unicode scalar values).
pub const NOTE_MAX_CHARS: usize = 500;

/// A single character repeated this many times consecutively is spam.
pub const REPEAT_RUN_LIMIT: usize = 5;

/// This many consecutive symbol/emoji-class characters is spam.
pub const SYMBOL_RUN_LIMIT: usize = 6;

/// Minimum letter count before the vowel-ratio gibberish check applies.
/// Short notes can be terse without being gibberish.
pub const GIBBERISH_MIN_LETTERS: usize = 6;

/// Lower bound of the acceptable vowel/letter ratio.
pub const VOWEL_RATIO_MIN: f64 = 0.18;

/// Upper bound of the acceptable vowel/letter ratio.
pub const VOWEL_RATIO_MAX: f64 = 0.9;

/// Default classifier (chat completion) base URL.
pub const CLASSIFIER_URL: &str = "http://localhost:11434";

/// Default classifier model name.
pub const CLASSIFIER_MODEL: &str = "llama3.2";

/// Timeout for classifier requests in seconds.
pub const CLASSIFIER_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// GEOCODING
// =============================================================================

/// Default geocoder base URL (Nominatim-compatible).
pub const GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Timeout for geocoder requests in seconds. Geocoder answers are small
/// and interactive; anything slower than this reads as a dead provider.
pub const GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Result limit for explicit full searches.
pub const SEARCH_LIMIT: usize = 5;

/// Result limit for typeahead suggestions.
pub const SUGGESTION_LIMIT: usize = 3;

/// Debounce window for typeahead lookups in milliseconds. Each keystroke
/// restarts the timer; only the most recent query survives the window.
pub const DEBOUNCE_MS: u64 = 300;

/// Fallback label when reverse geocoding yields nothing usable.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

// =============================================================================
// RECENT SEARCHES
// =============================================================================

/// Maximum entries kept in the persisted recent-searches list.
pub const RECENTS_STORED_MAX: usize = 8;

/// Maximum entries surfaced to the UI from the list head.
pub const RECENTS_DISPLAY_MAX: usize = 4;

/// File name of the persisted recent-searches list inside the data dir.
pub const RECENTS_FILE: &str = "recent-searches.json";

// =============================================================================
// NOTE BACKEND
// =============================================================================

/// Default note collection base URL.
pub const NOTES_URL: &str = "http://localhost:8000";

/// Timeout for note backend requests in seconds.
pub const NOTES_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// REALTIME SYNC
// =============================================================================

/// Default event bus broadcast channel capacity.
///
/// Recommended: 256 for production, 32 for tests.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Initial reconnect backoff after the change feed drops, in milliseconds.
pub const RECONNECT_BASE_MS: u64 = 500;

/// Reconnect backoff ceiling in milliseconds. Doubling stops here.
pub const RECONNECT_MAX_MS: u64 = 30_000;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Environment variable for the note collection base URL.
pub const ENV_NOTES_BASE_URL: &str = "LOCI_NOTES_BASE_URL";

/// Environment variable for the optional note backend bearer token.
pub const ENV_NOTES_TOKEN: &str = "LOCI_NOTES_TOKEN";

/// Environment variable for the note backend timeout in seconds.
pub const ENV_NOTES_TIMEOUT_SECS: &str = "LOCI_NOTES_TIMEOUT_SECS";

/// Environment variable for the geocoder base URL.
pub const ENV_GEOCODER_BASE_URL: &str = "LOCI_GEOCODER_BASE_URL";

/// Environment variable for the geocoder timeout in seconds.
pub const ENV_GEOCODER_TIMEOUT_SECS: &str = "LOCI_GEOCODER_TIMEOUT_SECS";

/// Environment variable for the classifier base URL.
pub const ENV_CLASSIFIER_BASE_URL: &str = "LOCI_CLASSIFIER_BASE_URL";

/// Environment variable for the classifier model name.
pub const ENV_CLASSIFIER_MODEL: &str = "LOCI_CLASSIFIER_MODEL";

/// Environment variable for the classifier timeout in seconds.
pub const ENV_CLASSIFIER_TIMEOUT_SECS: &str = "LOCI_CLASSIFIER_TIMEOUT_SECS";

/// Environment variable selecting the moderation strategy
/// (`heuristic` or `classified`).
pub const ENV_MODERATION_STRATEGY: &str = "LOCI_MODERATION_STRATEGY";

/// Environment variable overriding the recent-searches file path.
pub const ENV_RECENTS_PATH: &str = "LOCI_RECENTS_PATH";

/// Environment variable for the session owner id.
pub const ENV_OWNER_ID: &str = "LOCI_OWNER_ID";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earth_radii_are_consistent() {
        // Runtime check needed for floating point arithmetic
        assert!((EARTH_RADIUS_KM * 1000.0 - EARTH_RADIUS_M).abs() < f64::EPSILON);
    }

    #[test]
    fn recents_caps_ordered() {
        const {
            assert!(RECENTS_DISPLAY_MAX < RECENTS_STORED_MAX);
        }
    }

    #[test]
    fn circle_point_bounds_ordered() {
        const {
            assert!(CIRCLE_POINTS_MIN <= CIRCLE_POINTS);
        }
    }

    #[test]
    fn vowel_ratio_band_is_sane() {
        assert!(VOWEL_RATIO_MIN > 0.0);
        assert!(VOWEL_RATIO_MAX < 1.0);
        assert!(VOWEL_RATIO_MIN < VOWEL_RATIO_MAX);
    }

    #[test]
    fn reconnect_backoff_bounds_ordered() {
        const {
            assert!(RECONNECT_BASE_MS < RECONNECT_MAX_MS);
        }
    }

    #[test]
    fn default_viewport_is_a_valid_coordinate() {
        assert!(crate::models::Coordinates::is_valid(
            VIEWPORT_CENTER_LAT,
            VIEWPORT_CENTER_LON
        ));
    }

    #[test]
    fn search_limits_ordered() {
        const {
            assert!(SUGGESTION_LIMIT < SEARCH_LIMIT);
        }
    }
}
