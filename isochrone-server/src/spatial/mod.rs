//! Master location table and its spatial index.
//!
//! Walking expansion needs "every location within r metres of here". The
//! query runs in two stages: an R-tree box query in degrees for speed, then
//! an exact haversine filter on the survivors.

use std::collections::HashMap;

use rstar::{AABB, RTree, RTreeObject};

use crate::domain::{LatLon, Location, LocationId};
use crate::geodesy::{BoundingBox, haversine_m};

/// Slack added to the box query so locations right at the radius are not
/// lost to the linear degree approximation.
const BOX_SLACK: f64 = 1.01;

/// R-tree entry: a location's position (x = lon, y = lat) and its table slot.
#[derive(Debug, Clone)]
struct LocationNode {
    point: [f64; 2],
    slot: usize,
}

impl RTreeObject for LocationNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// A location found near a point.
#[derive(Debug, Clone, Copy)]
pub struct Nearby<'a> {
    pub location: &'a Location,
    pub meters: f64,
}

/// Process-wide, read-only location table with a spatial index.
pub struct LocationTable {
    locations: Vec<Location>,
    by_id: HashMap<LocationId, usize>,
    tree: RTree<LocationNode>,
}

impl LocationTable {
    /// Build the table. Later duplicates of an id are ignored.
    pub fn new(locations: Vec<Location>) -> Self {
        let mut kept = Vec::with_capacity(locations.len());
        let mut by_id = HashMap::with_capacity(locations.len());
        for location in locations {
            if by_id.contains_key(&location.id) {
                continue;
            }
            by_id.insert(location.id.clone(), kept.len());
            kept.push(location);
        }

        let nodes = kept
            .iter()
            .enumerate()
            .map(|(slot, l)| LocationNode {
                point: [l.position.lon(), l.position.lat()],
                slot,
            })
            .collect();

        Self {
            locations: kept,
            by_id,
            tree: RTree::bulk_load(nodes),
        }
    }

    pub fn get(&self, id: &LocationId) -> Option<&Location> {
        self.by_id.get(id).map(|&slot| &self.locations[slot])
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// Locations inside a degree box, unfiltered by true distance.
    ///
    /// A box crossing the antimeridian is queried as two envelopes.
    pub fn in_box(&self, bbox: &BoundingBox) -> impl Iterator<Item = &Location> {
        bbox.wrapped().into_iter().flat_map(move |part| {
            let envelope =
                AABB::from_corners([part.min_lon, part.min_lat], [part.max_lon, part.max_lat]);
            self.tree
                .locate_in_envelope(&envelope)
                .map(|node| &self.locations[node.slot])
                .collect::<Vec<_>>()
        })
    }

    /// Locations within `radius_m` metres of `center`, nearest first.
    ///
    /// Ties are broken by id so the order is stable across runs.
    pub fn within(&self, center: LatLon, radius_m: f64) -> Vec<Nearby<'_>> {
        if radius_m <= 0.0 {
            return Vec::new();
        }
        let bbox = BoundingBox::around(center, radius_m * BOX_SLACK);
        let mut found: Vec<Nearby<'_>> = self
            .in_box(&bbox)
            .filter_map(|location| {
                let meters = haversine_m(center, location.position);
                (meters <= radius_m).then_some(Nearby { location, meters })
            })
            .collect();
        found.sort_by(|a, b| {
            a.meters
                .total_cmp(&b.meters)
                .then_with(|| a.location.id.cmp(&b.location.id))
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::MetersPerDegree;

    fn ll(lat: f64, lon: f64) -> LatLon {
        LatLon::new(lat, lon).unwrap()
    }

    fn loc(id: &str, lat: f64, lon: f64) -> Location {
        Location::new(LocationId::parse(id).unwrap(), ll(lat, lon), id)
    }

    /// A point `meters` north of the centre.
    fn north_of(center: LatLon, meters: f64) -> (f64, f64) {
        let mpd = MetersPerDegree::at(center);
        (center.lat() + meters / mpd.lat, center.lon())
    }

    #[test]
    fn lookup_by_id() {
        let table = LocationTable::new(vec![loc("a", 37.0, -122.0), loc("b", 37.1, -122.1)]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&LocationId::parse("b").unwrap()).unwrap().title,
            "b"
        );
        assert!(table.get(&LocationId::parse("z").unwrap()).is_none());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let table = LocationTable::new(vec![loc("a", 37.0, -122.0), loc("a", 38.0, -122.0)]);
        assert_eq!(table.len(), 1);
        let a = table.get(&LocationId::parse("a").unwrap()).unwrap();
        assert_eq!(a.position.lat(), 37.0);
    }

    #[test]
    fn within_filters_by_true_distance() {
        let center = ll(37.77, -122.42);
        let (lat_near, lon_near) = north_of(center, 300.0);
        let (lat_far, lon_far) = north_of(center, 700.0);
        let table = LocationTable::new(vec![
            loc("near", lat_near, lon_near),
            loc("far", lat_far, lon_far),
            loc("here", 37.77, -122.42),
        ]);

        let found: Vec<_> = table
            .within(center, 500.0)
            .into_iter()
            .map(|n| n.location.id.as_str().to_string())
            .collect();
        assert_eq!(found, vec!["here".to_string(), "near".to_string()]);
    }

    #[test]
    fn box_corners_are_filtered_out() {
        // A point in the box corner is ~1.41 r away and must not be returned.
        let center = ll(37.77, -122.42);
        let mpd = MetersPerDegree::at(center);
        let corner = loc(
            "corner",
            37.77 + 450.0 / mpd.lat,
            -122.42 + 450.0 / mpd.lon,
        );
        let table = LocationTable::new(vec![corner]);
        assert_eq!(table.in_box(&BoundingBox::around(center, 500.0)).count(), 1);
        assert!(table.within(center, 500.0).is_empty());
    }

    #[test]
    fn within_reaches_across_the_antimeridian() {
        let center = ll(0.0, 179.999);
        let table = LocationTable::new(vec![
            loc("west", 0.0, -179.999),
            loc("far-west", 0.0, -179.9),
        ]);

        let found = table.within(center, 1000.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location.id.as_str(), "west");
        assert!((found[0].meters - 222.4).abs() < 1.0, "got {}", found[0].meters);
    }

    #[test]
    fn zero_radius_finds_nothing() {
        let table = LocationTable::new(vec![loc("a", 37.0, -122.0)]);
        assert!(table.within(ll(37.0, -122.0), 0.0).is_empty());
    }
}
