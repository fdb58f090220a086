//! Haversine great-circle distance between coordinate pairs.

use loci_core::defaults::EARTH_RADIUS_KM;
use loci_core::Coordinates;

/// Great-circle distance in kilometers between two points, using the
/// haversine formula on a sphere of mean Earth radius.
///
/// Symmetric in its arguments and exactly zero for identical points.
/// Error versus a true ellipsoid stays under 0.5%, well inside what a
/// radius filter for nearby notes needs.
pub fn haversine_distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // Clamp guards asin against floating point drift on near-antipodal pairs.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    /// One degree of arc on the mean sphere: 2π · 6371 / 360.
    const DEGREE_KM: f64 = 111.194_926_644_558_74;

    #[test]
    fn test_identical_points_are_zero() {
        let p = coords(24.5854, 73.7125);
        assert_eq!(haversine_distance_km(p, p), 0.0);

        let origin = coords(0.0, 0.0);
        assert_eq!(haversine_distance_km(origin, origin), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = coords(24.5854, 73.7125);
        let b = coords(48.8566, 2.3522);
        let ab = haversine_distance_km(a, b);
        let ba = haversine_distance_km(b, a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_one_degree_along_equator() {
        let d = haversine_distance_km(coords(0.0, 0.0), coords(0.0, 1.0));
        assert!((d - DEGREE_KM).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn test_one_degree_along_meridian() {
        let d = haversine_distance_km(coords(0.0, 0.0), coords(1.0, 0.0));
        assert!((d - DEGREE_KM).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn test_pole_to_pole() {
        let d = haversine_distance_km(coords(90.0, 0.0), coords(-90.0, 0.0));
        let half_circumference = std::f64::consts::PI * 6371.0;
        assert!((d - half_circumference).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_antipodal_points_on_equator() {
        let d = haversine_distance_km(coords(0.0, 0.0), coords(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * 6371.0;
        assert!((d - half_circumference).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_short_east_west_hop_at_udaipur() {
        // At latitude φ an east-west degree shrinks by cos(φ).
        let d = haversine_distance_km(coords(24.5854, 73.7125), coords(24.5854, 73.7225));
        let expected = DEGREE_KM * (24.5854_f64.to_radians().cos()) * 0.01;
        assert!((d - expected).abs() < 1e-4, "got {}, expected {}", d, expected);
    }

    #[test]
    fn test_known_city_pair() {
        // Udaipur to Jaipur, roughly 335 km great-circle.
        let d = haversine_distance_km(coords(24.5854, 73.7125), coords(26.9124, 75.7873));
        assert!((300.0..370.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_distance_is_non_negative_across_sign_changes() {
        let pairs = [
            (coords(10.0, 10.0), coords(-10.0, -10.0)),
            (coords(-45.0, 170.0), coords(45.0, -170.0)),
            (coords(0.0, -180.0), coords(0.0, 180.0)),
        ];
        for (a, b) in pairs {
            assert!(haversine_distance_km(a, b) >= 0.0);
        }
    }

    #[test]
    fn test_dateline_wrap_pair_is_identical_point() {
        // -180 and 180 are the same meridian.
        let d = haversine_distance_km(coords(12.0, -180.0), coords(12.0, 180.0));
        assert!(d < 1e-9, "got {}", d);
    }
}
