//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::catalog::ProximityResult;
use crate::domain::{Coord, SearchMode, Station, VehicleOrder};
use crate::feed::FeedSnapshot;
use crate::polling::SessionStatus;

use super::map::MapView;
use super::presenter::ViewState;

/// Search form submission.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub mode: SearchMode,
    /// Station id or catalog key, depending on `mode`.
    #[serde(default)]
    pub value: String,
}

/// Nearby-station request with the browser's geolocation report.
#[derive(Debug, Deserialize)]
pub struct NearbyForm {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Browser geolocation error code, when no fix was obtained.
    pub error: Option<String>,
    /// Search radius in metres.
    pub distance: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AutoRefreshForm {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityForm {
    pub hidden: bool,
}

/// Trip search form. Endpoint coordinates are present when the rider
/// picked a suggestion or used their own position.
#[derive(Debug, Deserialize)]
pub struct TripForm {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub via: Option<String>,
    pub from_lat: Option<f64>,
    pub from_lon: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lon: Option<f64>,
}

/// Query for the departures fragment.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesQuery {
    #[serde(default)]
    pub order: VehicleOrder,
}

/// Query for station suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// A station in API responses.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub uid: String,
    pub name: String,
    pub coords: Coord,
    /// Picker label, e.g. "Spens (1203)".
    pub label: String,
}

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.clone(),
            uid: station.uid.clone(),
            name: station.name.clone(),
            coords: station.coords,
            label: station.label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub stations: Vec<StationResult>,
}

/// A station near the rider.
#[derive(Debug, Serialize)]
pub struct NearbyResult {
    pub station: StationResult,
    pub distance_meters: u32,
    /// Picker label, e.g. "Spens (1203) - 120m".
    pub label: String,
}

impl NearbyResult {
    pub fn from_result(result: &ProximityResult) -> Self {
        Self {
            station: StationResult::from_station(&result.station),
            distance_meters: result.distance_meters,
            label: format!("{} - {}m", result.station.label(), result.distance_meters),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub stations: Vec<NearbyResult>,
}

/// Full page state for the frontend script.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub status: SessionStatus,
    pub snapshot: Option<FeedSnapshot>,
    pub last_updated: Option<String>,
    pub map: MapView,
    pub error: Option<String>,
}

impl StateResponse {
    pub fn from_view(view: &ViewState) -> Self {
        Self {
            status: view.status.clone(),
            snapshot: view.snapshot.clone(),
            last_updated: view
                .last_updated
                .map(|t| t.format("%H:%M:%S").to_string()),
            map: view.map.clone(),
            error: view.visible_error().map(str::to_string),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spens() -> Station {
        Station::new("1203", "ns-1203", "Spens", Coord::new(45.2480, 19.8450).unwrap())
    }

    #[test]
    fn nearby_label_includes_distance() {
        let result = NearbyResult::from_result(&ProximityResult {
            station: spens(),
            distance_meters: 120,
        });
        assert_eq!(result.label, "Spens (1203) - 120m");
        assert_eq!(result.station.uid, "ns-1203");
    }

    #[test]
    fn station_result_serializes_coords_as_pair() {
        let json = serde_json::to_value(StationResult::from_station(&spens())).unwrap();
        assert_eq!(json["coords"], serde_json::json!([45.248, 19.845]));
        assert_eq!(json["label"], "Spens (1203)");
    }

    #[test]
    fn search_form_defaults_to_id_mode() {
        let form: SearchForm = serde_json::from_str(r#"{"value":"1"}"#).unwrap();
        assert_eq!(form.mode, SearchMode::Id);

        let form: SearchForm = serde_json::from_str(r#"{"mode":"name"}"#).unwrap();
        assert_eq!(form.mode, SearchMode::Name);
        assert_eq!(form.value, "");
    }

    #[test]
    fn departures_order_parses() {
        let q: DeparturesQuery = serde_json::from_str(r#"{"order":"by_line"}"#).unwrap();
        assert_eq!(q.order, VehicleOrder::ByLine);
        assert_eq!(DeparturesQuery::default().order, VehicleOrder::Reversed);
    }
}
