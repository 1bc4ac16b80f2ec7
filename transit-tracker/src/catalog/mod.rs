//! Station catalog and proximity search.
//!
//! Holds the city's station list, fetched from the transit API at startup,
//! and answers name and proximity lookups against it.

mod proximity;
mod source;
mod stations;

pub use proximity::{ProximityResult, rank_by_proximity};
pub use source::CatalogSource;
pub use stations::StationCatalog;

#[cfg(test)]
pub(crate) use stations::testing;
