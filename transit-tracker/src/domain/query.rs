//! Departure queries and their resolution from raw user input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when user input cannot form a query.
///
/// The message is user-facing and is shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidInput {
    message: &'static str,
}

impl InvalidInput {
    pub(crate) const fn new(message: &'static str) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// A validated request identifying exactly one station.
///
/// Neither variant can hold blank text; construct through
/// [`Query::by_id`] or [`Query::by_catalog_selection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Exact station id, resolved by the server.
    ById { id: String },
    /// Catalog key, used for name-based and proximity-based selection.
    ByUid { uid: String },
}

impl Query {
    /// Build a query from a typed-in station id.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_tracker::domain::Query;
    ///
    /// let q = Query::by_id("  1203 ").unwrap();
    /// assert_eq!(q, Query::ById { id: "1203".into() });
    ///
    /// assert!(Query::by_id("   ").is_err());
    /// ```
    pub fn by_id(raw: &str) -> Result<Self, InvalidInput> {
        non_blank(raw, "Please enter a station ID").map(|id| Query::ById { id })
    }

    /// Build a query from a station picked out of the catalog.
    pub fn by_catalog_selection(uid: &str) -> Result<Self, InvalidInput> {
        non_blank(uid, "Please select a station").map(|uid| Query::ByUid { uid })
    }

    /// Request parameters for the departures endpoint (`id=…` or `uid=…`).
    pub fn params(&self) -> [(&'static str, &str); 1] {
        match self {
            Query::ById { id } => [("id", id.as_str())],
            Query::ByUid { uid } => [("uid", uid.as_str())],
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [(key, value)] = self.params();
        write!(f, "{key}={value}")
    }
}

fn non_blank(raw: &str, message: &'static str) -> Result<String, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::new(message));
    }
    Ok(trimmed.to_string())
}

/// The three ways a rider can pick a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Typed-in station id.
    #[default]
    Id,
    /// Station chosen from the full catalog list.
    Name,
    /// Station chosen from a proximity ranking.
    Coords,
}

impl SearchMode {
    /// Resolve the raw form value for this mode into a query.
    pub fn resolve(self, raw: &str) -> Result<Query, InvalidInput> {
        match self {
            SearchMode::Id => Query::by_id(raw),
            SearchMode::Name => Query::by_catalog_selection(raw),
            SearchMode::Coords => Query::by_catalog_selection(raw)
                .map_err(|_| InvalidInput::new("Please select a nearby station")),
        }
    }
}
