//! Conversion from API DTOs to domain types.

use tracing::debug;

use crate::domain::{Coord, DepartureSnapshot, InvalidCoord, Station, Vehicle};

use super::types::{DepartureBoardDto, StationDto, VehicleDto};

/// Error converting API data to domain types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("station {id}: {source}")]
    StationCoords { id: String, source: InvalidCoord },

    #[error("station {0} has a blank name")]
    BlankName(String),
}

/// Convert a station listing, skipping records that fail validation.
pub fn convert_stations(stations: Vec<StationDto>) -> Vec<Station> {
    stations
        .into_iter()
        .filter_map(|dto| match convert_station(dto) {
            Ok(station) => Some(station),
            Err(e) => {
                debug!(error = %e, "skipping invalid station");
                None
            }
        })
        .collect()
}

/// Convert one station record.
///
/// Listings from older API versions carry no `uid`; the stop id doubles
/// as the catalog key in that case.
pub fn convert_station(dto: StationDto) -> Result<Station, ConversionError> {
    let coords = Coord::try_from(dto.coords).map_err(|source| ConversionError::StationCoords {
        id: dto.id.clone(),
        source,
    })?;

    if dto.name.trim().is_empty() {
        return Err(ConversionError::BlankName(dto.id));
    }

    let uid = dto
        .uid
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| dto.id.clone());

    Ok(Station {
        id: dto.id,
        uid,
        name: dto.name,
        coords,
    })
}

/// Convert a departures board into a snapshot.
pub fn convert_board(board: DepartureBoardDto) -> Result<DepartureSnapshot, ConversionError> {
    let coords = Coord::try_from(board.coords).map_err(|source| ConversionError::StationCoords {
        id: board.id.clone(),
        source,
    })?;

    Ok(DepartureSnapshot {
        station_id: board.id,
        station_name: board.name,
        coords,
        vehicles: board.vehicles.into_iter().map(convert_vehicle).collect(),
    })
}

fn convert_vehicle(dto: VehicleDto) -> Vehicle {
    Vehicle {
        line_number: dto.line_number,
        seconds_left: clamp_count(dto.seconds_left),
        stations_between: clamp_count(dto.stations_between),
        station_name: dto.station_name.filter(|n| !n.trim().is_empty()),
        garage_no: dto.garage_no,
        coords: dto.coords.and_then(vehicle_position),
    }
}

/// The feed reports `[0, 0]` for vehicles without a GPS fix.
fn vehicle_position(pair: [f64; 2]) -> Option<Coord> {
    if pair[0] == 0.0 || pair[1] == 0.0 {
        return None;
    }
    Coord::try_from(pair).ok()
}

/// Counts from the feed can briefly go negative as a vehicle pulls in.
fn clamp_count(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}
