//! Transit station records.

use serde::Serialize;

use super::Coord;

/// A station known to the catalog.
///
/// `id` is the human-facing stop code printed on signage; `uid` is the
/// stable catalog key used by selection-based queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub uid: String,
    pub name: String,
    pub coords: Coord,
}

impl Station {
    pub fn new(
        id: impl Into<String>,
        uid: impl Into<String>,
        name: impl Into<String>,
        coords: Coord,
    ) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            name: name.into(),
            coords,
        }
    }

    /// Label used in station pickers, e.g. "Trg Slobode (1)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// Case-insensitive substring match against the station name.
    pub fn name_contains(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}
