//! Provenance tagging for data that may come from a fallback source.

use serde::Serialize;

/// A value fetched from a remote source, tagged with where it came from.
///
/// Fallback values are synthesized locally when the remote source fails,
/// so that the rider always sees something; the tag lets callers tell them
/// apart from live data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Fetched<T> {
    Live { value: T },
    Fallback { value: T, reason: String },
}

impl<T> Fetched<T> {
    pub fn live(value: T) -> Self {
        Fetched::Live { value }
    }

    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Fetched::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Fetched::Live { value } | Fetched::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Fetched::Live { value } | Fetched::Fallback { value, .. } => value,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Fetched::Live { .. })
    }

    /// Why the fallback was used, if it was.
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Fetched::Live { .. } => None,
            Fetched::Fallback { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let live = Fetched::live(3);
        assert!(live.is_live());
        assert_eq!(live.value(), &3);
        assert_eq!(live.fallback_reason(), None);

        let fb = Fetched::fallback(4, "connection refused");
        assert!(!fb.is_live());
        assert_eq!(fb.fallback_reason(), Some("connection refused"));
        assert_eq!(fb.into_value(), 4);
    }

    #[test]
    fn serializes_with_source_tag() {
        let json = serde_json::to_value(Fetched::fallback(1, "down")).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["reason"], "down");
        assert_eq!(json["value"], 1);
    }
}
