//! Trip planning between two places.
//!
//! Routing is not computed: every plan offers the same two sample
//! itineraries through the city centre. What is real is endpoint
//! handling, which validates the input and resolves every endpoint to a
//! position so the map can show it.

mod geocode;

use chrono::{Duration, NaiveTime};
use futures::future::join_all;
use serde::Serialize;

use crate::domain::{Coord, InvalidInput};

pub use geocode::{Geocode, Geocoder, GeocoderConfig};

/// A trip endpoint as entered by the rider.
///
/// `coords` is known when the place was picked from the catalog or is the
/// rider's own position; otherwise the name is geocoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub coords: Option<Coord>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coords: None,
        }
    }

    pub fn at(name: impl Into<String>, coords: Coord) -> Self {
        Self {
            name: name.into(),
            coords: Some(coords),
        }
    }
}

/// A trip endpoint with its position settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub coords: Coord,
}

/// How a leg is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Bus,
}

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct TripLeg {
    pub mode: TravelMode,
    /// Bus line, for bus legs.
    pub line: Option<String>,
    pub from: String,
    pub to: String,
    pub duration: Duration,
    pub departure: Option<NaiveTime>,
    pub arrival: Option<NaiveTime>,
    /// Walking distance in metres, for walk legs.
    pub distance_meters: Option<u32>,
}

impl TripLeg {
    fn walk(to: &str, minutes: i64, distance_meters: u32) -> Self {
        Self {
            mode: TravelMode::Walk,
            line: None,
            from: "Starting point".to_string(),
            to: to.to_string(),
            duration: Duration::minutes(minutes),
            departure: None,
            arrival: None,
            distance_meters: Some(distance_meters),
        }
    }

    fn bus(line: &str, from: &str, to: &str, departure: (u32, u32), arrival: (u32, u32)) -> Self {
        let departure = NaiveTime::from_hms_opt(departure.0, departure.1, 0);
        let arrival = NaiveTime::from_hms_opt(arrival.0, arrival.1, 0);
        let duration = match (departure, arrival) {
            (Some(d), Some(a)) => a - d,
            _ => Duration::zero(),
        };
        Self {
            mode: TravelMode::Bus,
            line: Some(line.to_string()),
            from: from.to_string(),
            to: to.to_string(),
            duration,
            departure,
            arrival,
            distance_meters: None,
        }
    }
}

/// A way of getting from one endpoint to the other.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub id: u32,
    pub changes: u32,
    pub legs: Vec<TripLeg>,
}

impl Itinerary {
    /// Total time over all legs.
    pub fn duration(&self) -> Duration {
        self.legs
            .iter()
            .fold(Duration::zero(), |total, leg| total + leg.duration)
    }

    /// Bus lines ridden, in order.
    pub fn bus_lines(&self) -> Vec<&str> {
        self.legs.iter().filter_map(|l| l.line.as_deref()).collect()
    }
}

/// The answer to a trip request.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub from: ResolvedLocation,
    pub to: ResolvedLocation,
    pub via: Option<ResolvedLocation>,
    pub itineraries: Vec<Itinerary>,
}

impl TripPlan {
    /// Heading for the results, e.g. "Liman → Spens".
    pub fn summary(&self) -> String {
        format!("{} → {}", self.from.name, self.to.name)
    }
}

/// Plans trips using a [`Geocode`] implementation for endpoints.
pub struct TripPlanner<G> {
    geocoder: G,
}

impl<G: Geocode> TripPlanner<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Plan a trip from `from` to `to`, optionally passing `via`.
    ///
    /// Both endpoints must have a non-blank name; a blank `via` is
    /// ignored.
    pub async fn plan(
        &self,
        from: Location,
        to: Location,
        via: Option<Location>,
    ) -> Result<TripPlan, InvalidInput> {
        if from.name.trim().is_empty() || to.name.trim().is_empty() {
            return Err(InvalidInput::new(
                "Please enter both starting and destination locations.",
            ));
        }
        let via = via.filter(|v| !v.name.trim().is_empty());

        let mut endpoints = vec![from, to];
        endpoints.extend(via);

        let mut resolved = join_all(endpoints.into_iter().map(|l| self.resolve(l)))
            .await
            .into_iter();

        // Exactly two or three endpoints went in, in order.
        let (Some(from), Some(to)) = (resolved.next(), resolved.next()) else {
            return Err(InvalidInput::new(
                "Please enter both starting and destination locations.",
            ));
        };
        let via = resolved.next();

        Ok(TripPlan {
            from,
            to,
            via,
            itineraries: sample_itineraries(),
        })
    }

    async fn resolve(&self, location: Location) -> ResolvedLocation {
        let name = location.name.trim().to_string();
        let coords = match location.coords {
            Some(coords) => coords,
            None => self.geocoder.locate(&name).await,
        };
        ResolvedLocation { name, coords }
    }
}

/// The fixed itineraries offered for every trip.
pub fn sample_itineraries() -> Vec<Itinerary> {
    vec![
        Itinerary {
            id: 1,
            changes: 1,
            legs: vec![
                TripLeg::walk("Trg Slobode", 5, 400),
                TripLeg::bus("4", "Trg Slobode", "Železnička stanica", (14, 25), (14, 37)),
                TripLeg::bus("11A", "Železnička stanica", "Destination", (14, 40), (14, 48)),
            ],
        },
        Itinerary {
            id: 2,
            changes: 0,
            legs: vec![
                TripLeg::walk("Bulevar oslobođenja", 8, 600),
                TripLeg::bus("6", "Bulevar oslobođenja", "Destination", (14, 30), (14, 54)),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::NOVI_SAD_CENTER;

    /// Geocoder that places everything at the centre and logs lookups.
    #[derive(Default)]
    struct FixedGeocoder {
        lookups: Mutex<Vec<String>>,
    }

    impl Geocode for FixedGeocoder {
        async fn locate(&self, name: &str) -> Coord {
            self.lookups.lock().unwrap().push(name.to_string());
            NOVI_SAD_CENTER
        }
    }

    #[test]
    fn sample_routes() {
        let routes = sample_itineraries();
        assert_eq!(routes.len(), 2);

        assert_eq!(routes[0].duration(), Duration::minutes(25));
        assert_eq!(routes[0].changes, 1);
        assert_eq!(routes[0].bus_lines(), vec!["4", "11A"]);

        assert_eq!(routes[1].duration(), Duration::minutes(32));
        assert_eq!(routes[1].changes, 0);
        assert_eq!(routes[1].bus_lines(), vec!["6"]);
    }

    #[tokio::test]
    async fn blank_endpoint_rejected() {
        let planner = TripPlanner::new(FixedGeocoder::default());

        let err = planner
            .plan(Location::named(" "), Location::named("Spens"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Please enter both starting and destination locations."
        );
        assert!(planner.geocoder.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_unplaced_endpoints_are_geocoded() {
        let planner = TripPlanner::new(FixedGeocoder::default());
        let home = Coord::new(45.2390, 19.8410).unwrap();

        let plan = planner
            .plan(
                Location::at("Current Location", home),
                Location::named(" Spens "),
                Some(Location::named("")),
            )
            .await
            .unwrap();

        assert_eq!(plan.from.coords, home);
        assert_eq!(plan.to.name, "Spens");
        assert_eq!(plan.to.coords, NOVI_SAD_CENTER);
        assert!(plan.via.is_none());
        assert_eq!(plan.summary(), "Current Location → Spens");
        assert_eq!(*planner.geocoder.lookups.lock().unwrap(), vec!["Spens"]);
    }

    #[tokio::test]
    async fn via_is_resolved() {
        let planner = TripPlanner::new(FixedGeocoder::default());

        let plan = planner
            .plan(
                Location::named("Liman"),
                Location::named("Spens"),
                Some(Location::named("Futog")),
            )
            .await
            .unwrap();

        assert_eq!(plan.via.unwrap().name, "Futog");
        assert_eq!(plan.itineraries.len(), 2);
    }
}
