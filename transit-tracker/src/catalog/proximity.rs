//! Proximity ranking of stations around a position.

use serde::Serialize;

use crate::domain::{Coord, Station, distance_meters};

/// A station together with its distance from a reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult {
    pub station: Station,
    /// Distance rounded to whole metres.
    pub distance_meters: u32,
}

/// Rank `stations` by distance from `origin`, keeping those within
/// `max_distance_meters`.
///
/// The result is sorted nearest first; stations at equal distance keep
/// their catalog order.
pub fn rank_by_proximity(
    stations: &[Station],
    origin: Coord,
    max_distance_meters: u32,
) -> Vec<ProximityResult> {
    let mut ranked: Vec<ProximityResult> = stations
        .iter()
        .map(|station| ProximityResult {
            distance_meters: round_meters(distance_meters(origin, station.coords)),
            station: station.clone(),
        })
        .filter(|r| r.distance_meters <= max_distance_meters)
        .collect();

    // `sort_by_key` is stable, which preserves catalog order on ties.
    ranked.sort_by_key(|r| r.distance_meters);
    ranked
}

fn round_meters(d: f64) -> u32 {
    // Haversine distances are bounded by half the Earth's circumference.
    d.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EARTH_RADIUS_M;

    fn origin() -> Coord {
        Coord::new(45.250000, 19.840000).unwrap()
    }

    /// A station exactly `meters` due north of the origin.
    fn station_at(uid: &str, meters: f64) -> Station {
        let o = origin();
        let lat = o.lat() + (meters / EARTH_RADIUS_M).to_degrees();
        Station::new(uid, uid, format!("Station {uid}"), Coord::new(lat, o.lon()).unwrap())
    }

    fn distances(ranked: &[ProximityResult]) -> Vec<u32> {
        ranked.iter().map(|r| r.distance_meters).collect()
    }

    #[test]
    fn filters_and_sorts() {
        let stations = vec![
            station_at("a", 50.0),
            station_at("b", 4000.0),
            station_at("c", 10.0),
            station_at("d", 2500.0),
            station_at("e", 9999.0),
        ];

        let ranked = rank_by_proximity(&stations, origin(), 3000);
        assert_eq!(distances(&ranked), vec![10, 50, 2500]);

        let uids: Vec<&str> = ranked.iter().map(|r| r.station.uid.as_str()).collect();
        assert_eq!(uids, vec!["c", "a", "d"]);
    }

    #[test]
    fn boundary_is_inclusive() {
        let stations = vec![station_at("a", 3000.0), station_at("b", 3001.0)];
        let ranked = rank_by_proximity(&stations, origin(), 3000);
        assert_eq!(distances(&ranked), vec![3000]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let stations = vec![
            station_at("first", 100.0),
            station_at("near", 20.0),
            station_at("second", 100.0),
        ];

        let ranked = rank_by_proximity(&stations, origin(), 500);
        let uids: Vec<&str> = ranked.iter().map(|r| r.station.uid.as_str()).collect();
        assert_eq!(uids, vec!["near", "first", "second"]);
    }

    #[test]
    fn nothing_in_range_is_empty() {
        let stations = vec![station_at("a", 5000.0)];
        assert!(rank_by_proximity(&stations, origin(), 100).is_empty());
        assert!(rank_by_proximity(&[], origin(), 100).is_empty());
    }
}
