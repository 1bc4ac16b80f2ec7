//! Live departure snapshots.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Coord;

/// A vehicle approaching the tracked station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    /// Line number as printed on the vehicle, e.g. "4" or "11A".
    pub line_number: String,
    pub seconds_left: u32,
    pub stations_between: u32,
    /// Station the vehicle is currently at, when reported.
    pub station_name: Option<String>,
    pub garage_no: String,
    pub coords: Option<Coord>,
}

impl Vehicle {
    /// Time to arrival formatted as `m:ss`.
    pub fn eta(&self) -> String {
        format_seconds(self.seconds_left)
    }
}

/// One point-in-time result of a departures fetch.
///
/// Snapshots are never mutated; every poll produces a new one that
/// replaces the previous one for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureSnapshot {
    pub station_id: String,
    pub station_name: String,
    pub coords: Coord,
    pub vehicles: Vec<Vehicle>,
}

impl DepartureSnapshot {
    /// Vehicles in display order.
    pub fn ordered_vehicles(&self, order: VehicleOrder) -> Vec<&Vehicle> {
        let mut vehicles: Vec<&Vehicle> = self.vehicles.iter().collect();
        match order {
            VehicleOrder::ByLine => vehicles.sort_by(|a, b| {
                compare_lines(&a.line_number, &b.line_number)
                    .then(a.seconds_left.cmp(&b.seconds_left))
            }),
            VehicleOrder::Reversed => vehicles.reverse(),
        }
        vehicles
    }
}

/// How vehicles are ordered on the departures table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleOrder {
    /// Grouped by line, soonest first within a line.
    ByLine,
    /// Feed order reversed; the feed lists the furthest vehicle first.
    #[default]
    Reversed,
}

/// Compare line numbers numerically where possible ("4" < "11A" < "12").
fn compare_lines(a: &str, b: &str) -> Ordering {
    fn split(line: &str) -> (Option<u32>, &str) {
        let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let (num, rest) = line.split_at(digits);
        (num.parse().ok(), rest)
    }

    match (split(a), split(b)) {
        ((Some(x), ra), (Some(y), rb)) => x.cmp(&y).then_with(|| ra.cmp(rb)),
        ((Some(_), _), (None, _)) => Ordering::Less,
        ((None, _), (Some(_), _)) => Ordering::Greater,
        _ => a.cmp(b),
    }
}

/// Format a number of seconds as `m:ss`.
///
/// ```
/// use transit_tracker::domain::format_seconds;
///
/// assert_eq!(format_seconds(0), "0:00");
/// assert_eq!(format_seconds(75), "1:15");
/// assert_eq!(format_seconds(3600), "60:00");
/// ```
pub fn format_seconds(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
