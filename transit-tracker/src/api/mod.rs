//! Transit API client.
//!
//! HTTP access to the city's stations API, plus the built-in data that
//! stands in for it when it cannot be reached.

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL, DEFAULT_CITY_CODE};
pub use convert::ConversionError;
pub use error::ApiError;
pub use mock::{fallback_stations, synthetic_snapshot};
pub use types::{DepartureBoardDto, StationDto, VehicleDto};
