//! Display circle generation around a pin.

use tracing::debug;

use loci_core::defaults::{CIRCLE_POINTS_MIN, EARTH_RADIUS_M};
use loci_core::{Coordinates, Error, Result};

/// A closed ring of `point_count + 1` geographic points at `radius_meters`
/// from `center`, bearings evenly spaced over the full circle.
///
/// Uses the spherical destination-point formula on the mean-radius sphere.
/// The final point repeats the first exactly, so the ring is closed and
/// ready to hand to a polygon overlay. Purely for display; the nearby
/// query filters on haversine distance, never on this ring.
pub fn circle_polygon(
    center: Coordinates,
    radius_meters: f64,
    point_count: usize,
) -> Result<Vec<Coordinates>> {
    if point_count < CIRCLE_POINTS_MIN {
        return Err(Error::Validation(format!(
            "circle needs at least {} points, got {}",
            CIRCLE_POINTS_MIN, point_count
        )));
    }
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(Error::Validation(format!(
            "circle radius must be positive, got {}",
            radius_meters
        )));
    }

    let angular = radius_meters / EARTH_RADIUS_M;
    let lat_c = center.latitude.to_radians();
    let lon_c = center.longitude.to_radians();

    let mut ring = Vec::with_capacity(point_count + 1);
    for i in 0..point_count {
        let bearing = 2.0 * std::f64::consts::PI * (i as f64) / (point_count as f64);

        let lat = (lat_c.sin() * angular.cos() + lat_c.cos() * angular.sin() * bearing.cos())
            .asin();
        let lon = lon_c
            + (bearing.sin() * angular.sin() * lat_c.cos())
                .atan2(angular.cos() - lat_c.sin() * lat.sin());

        ring.push(Coordinates {
            latitude: lat.to_degrees(),
            longitude: normalize_longitude(lon.to_degrees()),
        });
    }
    ring.push(ring[0]);

    debug!(
        radius_m = radius_meters,
        point_count,
        "circle polygon generated"
    );

    Ok(ring)
}

/// Wrap a longitude into [-180, 180].
fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 540.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps exact multiples to -180; keep +180 as is for inputs
    // that were already in range.
    if wrapped == -180.0 && lon == 180.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::haversine_distance_km;
    use loci_core::defaults::CIRCLE_POINTS;

    fn center() -> Coordinates {
        Coordinates::new(24.5854, 73.7125).unwrap()
    }

    #[test]
    fn test_ring_has_point_count_plus_one_vertices() {
        let ring = circle_polygon(center(), 1000.0, CIRCLE_POINTS).unwrap();
        assert_eq!(ring.len(), CIRCLE_POINTS + 1);
    }

    #[test]
    fn test_ring_is_closed_exactly() {
        let ring = circle_polygon(center(), 1000.0, 32).unwrap();
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_all_vertices_at_requested_radius() {
        let radius_m = 1000.0;
        let ring = circle_polygon(center(), radius_m, CIRCLE_POINTS).unwrap();
        for vertex in &ring {
            let d_km = haversine_distance_km(center(), *vertex);
            assert!(
                (d_km - radius_m / 1000.0).abs() < 1e-6,
                "vertex at {} km, wanted {} km",
                d_km,
                radius_m / 1000.0
            );
        }
    }

    #[test]
    fn test_first_vertex_is_due_north() {
        let ring = circle_polygon(center(), 1000.0, CIRCLE_POINTS).unwrap();
        let north = ring[0];
        assert!(north.latitude > center().latitude);
        assert!((north.longitude - center().longitude).abs() < 1e-9);
    }

    #[test]
    fn test_vertices_stay_in_valid_ranges_near_dateline() {
        let near_dateline = Coordinates::new(10.0, 179.9995).unwrap();
        let ring = circle_polygon(near_dateline, 500.0, CIRCLE_POINTS).unwrap();
        for vertex in &ring {
            assert!((-90.0..=90.0).contains(&vertex.latitude));
            assert!(
                (-180.0..=180.0).contains(&vertex.longitude),
                "longitude {} out of range",
                vertex.longitude
            );
        }
        // The circle genuinely crosses the antimeridian.
        assert!(ring.iter().any(|v| v.longitude < 0.0));
        assert!(ring.iter().any(|v| v.longitude > 0.0));
    }

    #[test]
    fn test_too_few_points_rejected() {
        let err = circle_polygon(center(), 1000.0, 2).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_minimum_point_count_accepted() {
        let ring = circle_polygon(center(), 1000.0, CIRCLE_POINTS_MIN).unwrap();
        assert_eq!(ring.len(), CIRCLE_POINTS_MIN + 1);
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        assert!(circle_polygon(center(), 0.0, CIRCLE_POINTS).is_err());
        assert!(circle_polygon(center(), -5.0, CIRCLE_POINTS).is_err());
        assert!(circle_polygon(center(), f64::NAN, CIRCLE_POINTS).is_err());
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(179.0), 179.0);
        assert_eq!(normalize_longitude(-179.0), -179.0);
        assert_eq!(normalize_longitude(181.0), -179.0);
        assert_eq!(normalize_longitude(-181.0), 179.0);
        assert_eq!(normalize_longitude(360.0), 0.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
    }

    #[test]
    fn test_large_radius_still_valid() {
        // A 2000 km display circle from Udaipur spans a lot of the map but
        // every vertex must still be a legal coordinate.
        let ring = circle_polygon(center(), 2_000_000.0, CIRCLE_POINTS).unwrap();
        for vertex in &ring {
            assert!((-90.0..=90.0).contains(&vertex.latitude));
            assert!((-180.0..=180.0).contains(&vertex.longitude));
        }
    }
}
