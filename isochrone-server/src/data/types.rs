//! Wire types for the data collaborators.
//!
//! These mirror the published JSON documents. They are deliberately loose
//! (plain strings, optional fields); `convert` turns them into validated
//! domain types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of the master location list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationDto {
    pub id: String,
    /// `[lat, lon]`
    pub lat_lon: [f64; 2],
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub stops: Vec<LocationStopDto>,
}

/// A route serving a location.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationStopDto {
    pub route_id: String,
    pub stop_id: String,
}

/// Route topology document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteDto {
    pub id: String,
    #[serde(default)]
    pub directions: Vec<DirectionDto>,
    #[serde(default)]
    pub stops: HashMap<String, RouteStopDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectionDto {
    pub id: String,
    #[serde(default)]
    pub stops: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteStopDto {
    pub location_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub title: String,
}

/// Wait-time table: route → direction → stop → minutes.
///
/// Entries may be `null` where no statistic could be computed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WaitTimesDto {
    #[serde(default)]
    pub routes: HashMap<String, HashMap<String, HashMap<String, Option<f64>>>>,
}

/// Ride-time table: route → direction → from stop → to stop → minutes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RideTimesDto {
    #[serde(default)]
    pub routes:
        HashMap<String, HashMap<String, HashMap<String, HashMap<String, Option<f64>>>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_location_list() {
        let json = r#"[
            {"id": "1001", "lat_lon": [37.77, -122.42], "title": "Market St & 4th St",
             "stops": [{"route_id": "14", "stop_id": "5555"}]},
            {"id": "1002", "lat_lon": [37.78, -122.41]}
        ]"#;
        let list: Vec<LocationDto> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].stops[0].route_id, "14");
        assert!(list[1].stops.is_empty());
        assert_eq!(list[1].title, "");
    }

    #[test]
    fn parse_route() {
        let json = r#"{
            "id": "14",
            "directions": [{"id": "0", "stops": ["a", "b"]}],
            "stops": {"a": {"location_id": "1001", "lat": 37.77, "lon": -122.42, "title": "A"}}
        }"#;
        let route: RouteDto = serde_json::from_str(json).unwrap();
        assert_eq!(route.directions[0].stops, vec!["a", "b"]);
        assert_eq!(route.stops["a"].location_id, "1001");
    }

    #[test]
    fn parse_tables_with_nulls() {
        let json = r#"{"routes": {"14": {"0": {"a": 4.5, "b": null}}}}"#;
        let waits: WaitTimesDto = serde_json::from_str(json).unwrap();
        assert_eq!(waits.routes["14"]["0"]["a"], Some(4.5));
        assert_eq!(waits.routes["14"]["0"]["b"], None);

        let json = r#"{"routes": {"14": {"0": {"a": {"b": 3.0, "c": 7.5}}}}}"#;
        let rides: RideTimesDto = serde_json::from_str(json).unwrap();
        assert_eq!(rides.routes["14"]["0"]["a"]["c"], Some(7.5));
    }
}
