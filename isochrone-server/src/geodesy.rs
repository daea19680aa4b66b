//! Geodesic helpers: great-circle distance and local degree/metre factors.
//!
//! Walking reach is specified in metres but the spatial index and the output
//! polygons work in degrees. Over a few kilometres the conversion can be
//! treated as linear around the point of interest.

use geo::{Distance, Haversine, Point};

use crate::domain::LatLon;

/// Great-circle distance in metres.
pub fn haversine_m(a: LatLon, b: LatLon) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

/// Metres spanned by one degree of latitude and of longitude at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetersPerDegree {
    pub lat: f64,
    pub lon: f64,
}

impl MetersPerDegree {
    /// Factors measured at `at`.
    pub fn at(at: LatLon) -> Self {
        // Measure across a small step so the result is local to `at`.
        const STEP: f64 = 0.01;
        let origin = at.to_point();
        let north = Point::new(origin.x(), origin.y() + STEP);
        let east = Point::new(origin.x() + STEP, origin.y());
        Self {
            lat: Haversine.distance(origin, north) / STEP,
            // Clamp so the poles do not divide by zero.
            lon: (Haversine.distance(origin, east) / STEP).max(1e-6),
        }
    }

    /// Latitude and longitude half-extents (degrees) of a box of `radius_m`.
    pub fn degree_extent(&self, radius_m: f64) -> (f64, f64) {
        (radius_m / self.lat, radius_m / self.lon)
    }
}

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The box enclosing a circle of `radius_m` around `center`.
    pub fn around(center: LatLon, radius_m: f64) -> Self {
        let (dlat, dlon) = MetersPerDegree::at(center).degree_extent(radius_m);
        Self {
            min_lat: center.lat() - dlat,
            min_lon: center.lon() - dlon,
            max_lat: center.lat() + dlat,
            max_lon: center.lon() + dlon,
        }
    }

    pub fn contains(&self, p: LatLon) -> bool {
        self.wrapped().iter().any(|b| {
            (b.min_lat..=b.max_lat).contains(&p.lat())
                && (b.min_lon..=b.max_lon).contains(&p.lon())
        })
    }

    /// The box as one or two boxes within [-180, 180] longitude, split where
    /// it crosses the antimeridian.
    pub fn wrapped(&self) -> Vec<BoundingBox> {
        if self.max_lon - self.min_lon >= 360.0 {
            return vec![Self {
                min_lon: -180.0,
                max_lon: 180.0,
                ..*self
            }];
        }
        if self.min_lon < -180.0 {
            vec![
                Self {
                    min_lon: -180.0,
                    ..*self
                },
                Self {
                    min_lon: self.min_lon + 360.0,
                    max_lon: 180.0,
                    ..*self
                },
            ]
        } else if self.max_lon > 180.0 {
            vec![
                Self {
                    max_lon: 180.0,
                    ..*self
                },
                Self {
                    min_lon: -180.0,
                    max_lon: self.max_lon - 360.0,
                    ..*self
                },
            ]
        } else {
            vec![*self]
        }
    }
}
