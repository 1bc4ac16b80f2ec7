//! Domain types for the transit tracker.
//!
//! All types enforce their invariants at construction time, so code
//! that receives them can trust their validity.

mod coord;
mod departure;
mod fetched;
mod query;
mod station;

pub use coord::{Coord, EARTH_RADIUS_M, InvalidCoord, NOVI_SAD_CENTER, distance_meters};
pub use departure::{DepartureSnapshot, Vehicle, VehicleOrder, format_seconds};
pub use fetched::Fetched;
pub use query::{InvalidInput, Query, SearchMode};
pub use station::Station;
