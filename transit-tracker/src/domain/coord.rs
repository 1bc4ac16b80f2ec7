//! Geographic coordinates and great-circle distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Trg Slobode, the centre of Novi Sad.
pub const NOVI_SAD_CENTER: Coord = Coord {
    lat: 45.267136,
    lon: 19.833549,
};

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lon}): {reason}")]
pub struct InvalidCoord {
    lat: f64,
    lon: f64,
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in degrees.
///
/// Latitude is within `[-90, 90]` and longitude within `[-180, 180]`;
/// any `Coord` value is valid by construction. Serializes as a
/// `[lat, lon]` array, which is how the transit API encodes positions.
///
/// # Examples
///
/// ```
/// use transit_tracker::domain::Coord;
///
/// let trg_slobode = Coord::new(45.267136, 19.833549).unwrap();
/// assert_eq!(trg_slobode.lat(), 45.267136);
///
/// assert!(Coord::new(91.0, 0.0).is_err());
/// assert!(Coord::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    lat: f64,
    lon: f64,
}

impl Coord {
    /// Create a coordinate, validating both components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoord> {
        let invalid = |reason| InvalidCoord { lat, lon, reason };

        if !lat.is_finite() || !lon.is_finite() {
            return Err(invalid("components must be finite"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }

        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<[f64; 2]> for Coord {
    type Error = InvalidCoord;

    fn try_from([lat, lon]: [f64; 2]) -> Result<Self, Self::Error> {
        Coord::new(lat, lon)
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.lat, c.lon]
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Great-circle distance between two coordinates, in metres.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_M`].
pub fn distance_meters(a: Coord, b: Coord) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coord {
        Coord::new(lat, lon).unwrap()
    }

    /// Offset `meters` due north of `origin`, exact on the haversine sphere.
    fn north_of(origin: Coord, meters: f64) -> Coord {
        coord(origin.lat + (meters / EARTH_RADIUS_M).to_degrees(), origin.lon)
    }

    #[test]
    fn same_point_is_zero() {
        let a = coord(45.267136, 19.833549);
        assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn known_distance_in_novi_sad() {
        let a = coord(45.250000, 19.840000);
        let b = north_of(a, 1000.0);

        let d = distance_meters(a, b);
        assert!((d - 1000.0).abs() < 10.0, "expected ~1000 m, got {d}");
    }

    #[test]
    fn station_to_station() {
        // Trg Slobode -> Železnička stanica, roughly 230 m apart.
        let trg = coord(45.267136, 19.833549);
        let zs = coord(45.267891, 19.836311);

        let d = distance_meters(trg, zs);
        assert!((200.0..260.0).contains(&d), "got {d}");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = distance_meters(coord(0.0, 0.0), coord(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half).abs() < 1.0);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Coord::new(-90.1, 0.0).is_err());
        assert!(Coord::new(90.1, 0.0).is_err());
        assert!(Coord::new(0.0, 180.5).is_err());
        assert!(Coord::new(0.0, -181.0).is_err());
        assert!(Coord::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn serializes_as_pair() {
        let c = coord(45.5, 19.25);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[45.5,19.25]");

        let back: Coord = serde_json::from_str("[45.5,19.25]").unwrap();
        assert_eq!(back, c);

        assert!(serde_json::from_str::<Coord>("[145.5,19.25]").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(coord(45.5, 19.25).to_string(), "45.500000, 19.250000");
    }
}
