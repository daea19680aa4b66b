//! Walking circles as polygons in degree space.

use std::f64::consts::TAU;

use geo::{Coord, LineString, Polygon};

use crate::domain::LatLon;
use crate::geodesy::MetersPerDegree;

/// A circle of `radius_m` around `center`, approximated by `segments` vertices.
///
/// The degree/metre factors are taken at the centre, which is accurate for
/// walking-scale radii.
pub fn circle(center: LatLon, radius_m: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(3);
    let (dlat, dlon) = MetersPerDegree::at(center).degree_extent(radius_m);

    let ring: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            Coord {
                x: center.lon() + dlon * angle.cos(),
                y: center.lat() + dlat * angle.sin(),
            }
        })
        .collect();

    // `Polygon::new` closes the ring.
    Polygon::new(LineString::new(ring), vec![])
}
