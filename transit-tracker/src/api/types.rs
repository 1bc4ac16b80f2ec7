//! Transit API response DTOs.
//!
//! These map directly to the JSON returned by the stations API. Fields the
//! API sometimes omits are `Option`, and coordinates are left as raw pairs
//! so that one bad record can be skipped rather than failing the response.

use serde::{Deserialize, Serialize};

/// A station as listed by `/api/stations/{city}/all`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationDto {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    pub name: String,
    pub coords: [f64; 2],
}

/// The departures board returned by `/api/stations/{city}/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartureBoardDto {
    pub id: String,
    pub name: String,
    pub coords: [f64; 2],
    #[serde(default)]
    pub vehicles: Vec<VehicleDto>,
}

/// A vehicle on the departures board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDto {
    #[serde(deserialize_with = "string_or_number")]
    pub line_number: String,
    pub seconds_left: i64,
    #[serde(default)]
    pub stations_between: i64,
    pub station_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub garage_no: String,
    pub coords: Option<[f64; 2]>,
}

/// The API is inconsistent about quoting line and garage numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
