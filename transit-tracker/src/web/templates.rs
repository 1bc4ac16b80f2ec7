//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{Station, Vehicle, VehicleOrder};
use crate::trips::{Itinerary, TravelMode, TripPlan};

use super::presenter::ViewState;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page: station search, departures board and trip planner.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub stations: Vec<StationOption>,
    pub radius_meters: u32,
    pub auto_refresh: bool,
    pub refresh_secs: u64,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub board: Option<BoardView>,
    pub error: Option<String>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Departures board fragment.
#[derive(Template)]
#[template(path = "departures.html")]
pub struct DeparturesTemplate {
    pub board: Option<BoardView>,
    pub error: Option<String>,
}

/// Trip results fragment.
#[derive(Template)]
#[template(path = "trips.html")]
pub struct TripsTemplate {
    pub summary: String,
    pub trips: Vec<ItineraryView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Station picker entry.
#[derive(Debug, Clone)]
pub struct StationOption {
    pub uid: String,
    pub label: String,
}

impl StationOption {
    pub fn from_station(station: &Station) -> Self {
        Self {
            uid: station.uid.clone(),
            label: station.label(),
        }
    }
}

/// The departures board for the tracked station.
#[derive(Debug, Clone)]
pub struct BoardView {
    /// "Name (id)".
    pub title: String,
    pub last_updated: String,
    pub is_live: bool,
    pub fallback_reason: Option<String>,
    pub rows: Vec<VehicleRow>,
}

impl BoardView {
    /// Build the board from the page state, if a station is tracked.
    pub fn from_view(view: &ViewState, order: VehicleOrder) -> Option<Self> {
        let fetched = view.snapshot.as_ref()?;
        let snapshot = fetched.value();

        Some(Self {
            title: format!("{} ({})", snapshot.station_name, snapshot.station_id),
            last_updated: view
                .last_updated
                .map(|t| format!("Last updated: {}", t.format("%H:%M:%S")))
                .unwrap_or_default(),
            is_live: fetched.is_live(),
            fallback_reason: fetched.fallback_reason().map(str::to_string),
            rows: snapshot
                .ordered_vehicles(order)
                .into_iter()
                .map(VehicleRow::from_vehicle)
                .collect(),
        })
    }
}

/// One row of the departures table.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRow {
    pub line: String,
    pub eta: String,
    pub stations_between: u32,
    pub at_station: String,
    pub garage_no: String,
}

impl VehicleRow {
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            line: vehicle.line_number.clone(),
            eta: vehicle.eta(),
            stations_between: vehicle.stations_between,
            at_station: vehicle
                .station_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            garage_no: vehicle.garage_no.clone(),
        }
    }
}

/// Itinerary card.
#[derive(Debug, Clone)]
pub struct ItineraryView {
    pub duration_mins: i64,
    pub changes: u32,
    pub lines: Vec<String>,
    pub legs: Vec<LegView>,
}

impl ItineraryView {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            duration_mins: itinerary.duration().num_minutes(),
            changes: itinerary.changes,
            lines: itinerary
                .bus_lines()
                .into_iter()
                .map(str::to_string)
                .collect(),
            legs: itinerary
                .legs
                .iter()
                .map(|leg| LegView {
                    icon: match leg.mode {
                        TravelMode::Walk => "🚶",
                        TravelMode::Bus => "🚌",
                    },
                    from: leg.from.clone(),
                    to: leg.to.clone(),
                    departure: leg.departure.map(|t| t.format("%H:%M").to_string()),
                })
                .collect(),
        }
    }

    pub fn changes_label(&self) -> String {
        match self.changes {
            1 => "1 change".to_string(),
            n => format!("{n} changes"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LegView {
    pub icon: &'static str,
    pub from: String,
    pub to: String,
    pub departure: Option<String>,
}

impl TripsTemplate {
    pub fn from_plan(plan: &TripPlan) -> Self {
        Self {
            summary: plan.summary(),
            trips: plan
                .itineraries
                .iter()
                .map(ItineraryView::from_itinerary)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DepartureSnapshot, Fetched, NOVI_SAD_CENTER};
    use crate::polling::Presenter;
    use crate::trips::sample_itineraries;
    use crate::web::presenter::WebPresenter;
    use std::time::Duration;

    fn vehicle(line: &str, seconds_left: u32, at: Option<&str>) -> Vehicle {
        Vehicle {
            line_number: line.into(),
            seconds_left,
            stations_between: 3,
            station_name: at.map(str::to_string),
            garage_no: "P-1".into(),
            coords: None,
        }
    }

    fn view_with(snapshot: Option<Fetched<DepartureSnapshot>>) -> ViewState {
        let presenter = WebPresenter::new(NOVI_SAD_CENTER, 13, Duration::from_secs(5));
        if let Some(s) = snapshot {
            presenter.snapshot_ready(&s, true);
        }
        presenter.view()
    }

    #[test]
    fn vehicle_row_defaults_unknown_station() {
        let row = VehicleRow::from_vehicle(&vehicle("4", 125, None));
        assert_eq!(row.eta, "2:05");
        assert_eq!(row.at_station, "Unknown");
    }

    #[test]
    fn board_for_fallback_snapshot() {
        let snapshot = DepartureSnapshot {
            station_id: "1".into(),
            station_name: "Trg Slobode".into(),
            coords: NOVI_SAD_CENTER,
            vehicles: vec![vehicle("7", 30, Some("Spens")), vehicle("4", 300, None)],
        };
        let view = view_with(Some(Fetched::fallback(snapshot, "HTTP 503")));

        let board = BoardView::from_view(&view, VehicleOrder::ByLine).unwrap();
        assert_eq!(board.title, "Trg Slobode (1)");
        assert!(!board.is_live);
        assert_eq!(board.fallback_reason.as_deref(), Some("HTTP 503"));
        assert_eq!(board.rows[0].line, "4");
        assert!(board.last_updated.starts_with("Last updated: "));
    }

    #[test]
    fn no_board_when_idle() {
        assert!(BoardView::from_view(&view_with(None), VehicleOrder::Reversed).is_none());
    }

    #[test]
    fn itinerary_view() {
        let trips = sample_itineraries();
        let view = ItineraryView::from_itinerary(&trips[0]);

        assert_eq!(view.duration_mins, 25);
        assert_eq!(view.changes_label(), "1 change");
        assert_eq!(view.lines, vec!["4", "11A"]);
        assert_eq!(view.legs[0].departure, None);
        assert_eq!(view.legs[1].departure.as_deref(), Some("14:25"));

        let view = ItineraryView::from_itinerary(&trips[1]);
        assert_eq!(view.changes_label(), "0 changes");
    }

    #[test]
    fn departures_fragment_renders() {
        let board = BoardView {
            title: "Spens (1203)".into(),
            last_updated: "Last updated: 14:02:11".into(),
            is_live: true,
            fallback_reason: None,
            rows: vec![VehicleRow::from_vehicle(&vehicle("11A", 61, Some("Liman")))],
        };
        let html = DeparturesTemplate {
            board: Some(board),
            error: None,
        }
        .render()
        .unwrap();

        assert!(html.contains("Spens (1203)"));
        assert!(html.contains("11A"));
        assert!(html.contains("1:01"));
    }
}
