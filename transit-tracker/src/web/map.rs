//! Map view model: markers plus where the map is looking.

use serde::Serialize;

use crate::catalog::ProximityResult;
use crate::domain::{Coord, DepartureSnapshot, format_seconds};
use crate::trips::TripPlan;

/// Marker colours, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Yellow,
    Blue,
    Green,
    Red,
    Orange,
}

pub const STATION_COLOR: MarkerColor = MarkerColor::Yellow;
pub const VEHICLE_COLOR: MarkerColor = MarkerColor::Blue;
pub const USER_COLOR: MarkerColor = MarkerColor::Green;
pub const TRIP_FROM_COLOR: MarkerColor = MarkerColor::Green;
pub const TRIP_TO_COLOR: MarkerColor = MarkerColor::Red;
pub const TRIP_VIA_COLOR: MarkerColor = MarkerColor::Orange;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub coords: Coord,
    /// Short text drawn on the marker itself (line number, station id).
    pub label: String,
    pub color: MarkerColor,
    /// Lines of popup text.
    pub popup: Vec<String>,
}

/// What part of the map is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: Coord, zoom: u8 },
    Fit { south_west: Coord, north_east: Coord },
}

impl Viewport {
    /// Smallest box containing every point; `None` for no points.
    pub fn fit(points: impl IntoIterator<Item = Coord>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut south, mut west, mut north, mut east) =
            (first.lat(), first.lon(), first.lat(), first.lon());
        for p in points {
            south = south.min(p.lat());
            north = north.max(p.lat());
            west = west.min(p.lon());
            east = east.max(p.lon());
        }
        // Corners of a box around valid coordinates are valid coordinates.
        let south_west = Coord::new(south, west).ok()?;
        let north_east = Coord::new(north, east).ok()?;
        Some(Viewport::Fit {
            south_west,
            north_east,
        })
    }
}

/// Everything drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub markers: Vec<Marker>,
    pub viewport: Viewport,
    /// Straight line between trip endpoints, when showing a trip.
    pub route: Vec<Coord>,
    #[serde(skip)]
    zoom: u8,
}

impl MapView {
    pub fn new(center: Coord, zoom: u8) -> Self {
        Self {
            markers: Vec::new(),
            viewport: Viewport::Center { center, zoom },
            route: Vec::new(),
            zoom,
        }
    }

    /// Draw a departures snapshot.
    ///
    /// With `recenter`, a lone station marker is centred at the default
    /// zoom and anything more is fitted; without it the viewport stays put.
    pub fn show_snapshot(&mut self, snapshot: &DepartureSnapshot, recenter: bool) {
        let mut markers = vec![Marker {
            coords: snapshot.coords,
            label: String::new(),
            color: STATION_COLOR,
            popup: vec![
                snapshot.station_name.clone(),
                format!("ID: {}", snapshot.station_id),
            ],
        }];

        markers.extend(snapshot.vehicles.iter().filter_map(|v| {
            v.coords.map(|coords| Marker {
                coords,
                label: v.line_number.clone(),
                color: VEHICLE_COLOR,
                popup: vec![
                    format!("Line {}", v.line_number),
                    format!("Vehicle: {}", v.garage_no),
                    format!("ETA: {}", format_seconds(v.seconds_left)),
                ],
            })
        }));

        if recenter {
            self.viewport = if markers.len() == 1 {
                Viewport::Center {
                    center: snapshot.coords,
                    zoom: self.zoom,
                }
            } else {
                Viewport::fit(markers.iter().map(|m| m.coords))
                    .unwrap_or_else(|| self.viewport.clone())
            };
        }
        self.markers = markers;
        self.route.clear();
    }

    /// Draw the rider's position and the stations ranked around it.
    pub fn show_ranking(&mut self, origin: Coord, results: &[ProximityResult]) {
        let mut markers = vec![Marker {
            coords: origin,
            label: String::new(),
            color: USER_COLOR,
            popup: vec!["Your Location".to_string()],
        }];
        markers.extend(results.iter().map(|r| Marker {
            coords: r.station.coords,
            label: r.station.id.clone(),
            color: STATION_COLOR,
            popup: vec![
                r.station.name.clone(),
                format!("Distance: {}m", r.distance_meters),
            ],
        }));

        if let Some(viewport) = Viewport::fit(markers.iter().map(|m| m.coords)) {
            self.viewport = viewport;
        }
        self.markers = markers;
        self.route.clear();
    }

    /// Draw trip endpoints and the line between them.
    pub fn show_trip(&mut self, plan: &TripPlan) {
        let endpoint = |coords, name: &str, color| Marker {
            coords,
            label: name.to_string(),
            color,
            popup: vec![name.to_string()],
        };

        let mut markers = vec![
            endpoint(plan.from.coords, &plan.from.name, TRIP_FROM_COLOR),
            endpoint(plan.to.coords, &plan.to.name, TRIP_TO_COLOR),
        ];
        if let Some(via) = &plan.via {
            markers.push(endpoint(via.coords, &via.name, TRIP_VIA_COLOR));
        }

        self.route = if plan.itineraries.is_empty() {
            Vec::new()
        } else {
            vec![plan.from.coords, plan.to.coords]
        };
        if let Some(viewport) = Viewport::fit(markers.iter().map(|m| m.coords)) {
            self.viewport = viewport;
        }
        self.markers = markers;
    }

    /// Remove every marker, keeping the viewport.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.route.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NOVI_SAD_CENTER, Station, Vehicle};

    fn coord(lat: f64, lon: f64) -> Coord {
        Coord::new(lat, lon).unwrap()
    }

    fn snapshot(vehicle_coords: Vec<Option<Coord>>) -> DepartureSnapshot {
        DepartureSnapshot {
            station_id: "1203".into(),
            station_name: "Spens".into(),
            coords: coord(45.2480, 19.8450),
            vehicles: vehicle_coords
                .into_iter()
                .enumerate()
                .map(|(i, coords)| Vehicle {
                    line_number: format!("{}", i + 1),
                    seconds_left: 90,
                    stations_between: 1,
                    station_name: None,
                    garage_no: format!("G{i}"),
                    coords,
                })
                .collect(),
        }
    }

    #[test]
    fn lone_station_is_centred() {
        let mut map = MapView::new(NOVI_SAD_CENTER, 13);
        map.show_snapshot(&snapshot(vec![None, None]), true);

        assert_eq!(map.markers.len(), 1);
        assert_eq!(
            map.viewport,
            Viewport::Center {
                center: coord(45.2480, 19.8450),
                zoom: 13
            }
        );
    }

    #[test]
    fn vehicles_are_fitted() {
        let mut map = MapView::new(NOVI_SAD_CENTER, 13);
        map.show_snapshot(&snapshot(vec![Some(coord(45.2400, 19.8500))]), true);

        assert_eq!(map.markers.len(), 2);
        assert_eq!(map.markers[1].color, VEHICLE_COLOR);
        assert_eq!(map.markers[1].popup[2], "ETA: 1:30");
        assert_eq!(
            map.viewport,
            Viewport::Fit {
                south_west: coord(45.2400, 19.8450),
                north_east: coord(45.2480, 19.8500),
            }
        );
    }

    #[test]
    fn tick_keeps_viewport() {
        let mut map = MapView::new(NOVI_SAD_CENTER, 13);
        let before = map.viewport.clone();

        map.show_snapshot(&snapshot(vec![Some(coord(45.2400, 19.8500))]), false);

        assert_eq!(map.viewport, before);
        assert_eq!(map.markers.len(), 2);
    }

    #[test]
    fn ranking_includes_user_and_fits() {
        let mut map = MapView::new(NOVI_SAD_CENTER, 13);
        let origin = coord(45.2450, 19.8400);
        let results = vec![ProximityResult {
            station: Station::new("7", "ns-7", "Liman", coord(45.2390, 19.8410)),
            distance_meters: 670,
        }];

        map.show_ranking(origin, &results);

        assert_eq!(map.markers[0].color, USER_COLOR);
        assert_eq!(map.markers[1].popup[1], "Distance: 670m");
        assert!(matches!(map.viewport, Viewport::Fit { .. }));
    }

    #[test]
    fn fit_of_nothing_is_none() {
        assert!(Viewport::fit(Vec::new()).is_none());
    }
}
