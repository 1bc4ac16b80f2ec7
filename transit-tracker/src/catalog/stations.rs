//! The in-memory station catalog.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::fallback_stations;
use crate::domain::{Coord, Fetched, Station};

use super::proximity::{ProximityResult, rank_by_proximity};
use super::source::CatalogSource;

/// Thread-safe holder of the authoritative station list.
///
/// The list is replaced wholesale on every refresh; it is never merged.
pub struct StationCatalog<S> {
    inner: Arc<RwLock<Vec<Station>>>,
    source: Arc<S>,
}

impl<S> Clone for StationCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: CatalogSource> StationCatalog<S> {
    /// Create an empty catalog backed by `source`.
    ///
    /// Call [`refresh`](Self::refresh) to populate it.
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            source: Arc::new(source),
        }
    }

    /// Replace the held stations with a fresh listing from the source.
    ///
    /// When the source fails, or answers with no stations at all, the
    /// built-in fallback set is installed instead so the catalog is never
    /// left empty.
    pub async fn refresh(&self) -> Fetched<Vec<Station>> {
        let fetched = match self.source.fetch_stations().await {
            Ok(stations) if !stations.is_empty() => {
                info!(count = stations.len(), "loaded station catalog");
                Fetched::live(stations)
            }
            Ok(_) => {
                warn!("station listing was empty, using built-in stations");
                Fetched::fallback(fallback_stations(), "station listing was empty")
            }
            Err(e) => {
                warn!(error = %e, "station listing unavailable, using built-in stations");
                Fetched::fallback(fallback_stations(), e.to_string())
            }
        };

        let mut guard = self.inner.write().await;
        *guard = fetched.value().clone();

        fetched
    }

    /// A copy of every held station, in catalog order.
    pub async fn stations(&self) -> Vec<Station> {
        self.inner.read().await.clone()
    }

    /// Get the number of stations in the catalog.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the catalog is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Look up a station by its catalog key.
    pub async fn find_by_uid(&self, uid: &str) -> Option<Station> {
        let guard = self.inner.read().await;
        guard.iter().find(|s| s.uid == uid).cloned()
    }

    /// Stations whose name contains `text`, ignoring case.
    ///
    /// The result is not capped; callers limit it for display.
    pub async fn find_by_name_substring(&self, text: &str) -> Vec<Station> {
        let needle = text.to_lowercase();
        let guard = self.inner.read().await;
        guard
            .iter()
            .filter(|s| s.name_contains(&needle))
            .cloned()
            .collect()
    }

    /// Stations within `max_distance_meters` of `origin`, nearest first.
    pub async fn rank_by_proximity(
        &self,
        origin: Coord,
        max_distance_meters: u32,
    ) -> Vec<ProximityResult> {
        let guard = self.inner.read().await;
        rank_by_proximity(&guard, origin, max_distance_meters)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;
    use crate::api::ApiError;

    /// Catalog source that replays a queue of canned responses.
    pub struct ScriptedSource {
        responses: Mutex<Vec<Result<Vec<Station>, ApiError>>>,
    }

    impl ScriptedSource {
        pub fn new(mut responses: Vec<Result<Vec<Station>, ApiError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl CatalogSource for ScriptedSource {
        async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
            self.responses.lock().unwrap().pop().unwrap_or_else(|| {
                Err(ApiError::Api {
                    status: 503,
                    message: "script exhausted".into(),
                })
            })
        }
    }

    pub fn station(id: &str, name: &str, lat: f64, lon: f64) -> Station {
        Station::new(id, format!("uid-{id}"), name, Coord::new(lat, lon).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedSource, station};
    use super::*;
    use crate::api::ApiError;

    fn live_stations() -> Vec<Station> {
        vec![
            station("10", "Liman 4", 45.2390, 19.8410),
            station("11", "Spens", 45.2480, 19.8450),
            station("12", "Limanska pijaca", 45.2420, 19.8470),
        ]
    }

    fn unavailable() -> ApiError {
        ApiError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_contents() {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![
            Ok(live_stations()),
            Ok(vec![station("99", "Detelinara", 45.26, 19.81)]),
        ]));

        assert!(catalog.is_empty().await);

        let first = catalog.refresh().await;
        assert!(first.is_live());
        assert_eq!(catalog.len().await, 3);

        catalog.refresh().await;
        let stations = catalog.stations().await;
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "99");
    }

    #[tokio::test]
    async fn refresh_failure_installs_fallback() {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![
            Ok(live_stations()),
            Err(unavailable()),
        ]));

        catalog.refresh().await;
        let fetched = catalog.refresh().await;

        assert!(!fetched.is_live());
        assert!(fetched.fallback_reason().unwrap().contains("502"));
        assert_eq!(catalog.stations().await, fallback_stations());
    }

    #[tokio::test]
    async fn empty_listing_installs_fallback() {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![Ok(Vec::new())]));

        let fetched = catalog.refresh().await;
        assert!(!fetched.is_live());
        assert!(!catalog.is_empty().await);
    }

    #[tokio::test]
    async fn find_by_name_substring_ignores_case() {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![Ok(live_stations())]));
        catalog.refresh().await;

        let found = catalog.find_by_name_substring("LIMAN").await;
        let ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "12"]);

        assert!(catalog.find_by_name_substring("centar").await.is_empty());
    }

    #[tokio::test]
    async fn find_by_uid() {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![Ok(live_stations())]));
        catalog.refresh().await;

        assert_eq!(catalog.find_by_uid("uid-11").await.unwrap().name, "Spens");
        assert!(catalog.find_by_uid("uid-404").await.is_none());
    }

    #[tokio::test]
    async fn rank_uses_held_stations() {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![Ok(live_stations())]));
        catalog.refresh().await;

        let spens = Coord::new(45.2480, 19.8450).unwrap();
        let ranked = catalog.rank_by_proximity(spens, 1500).await;

        assert_eq!(ranked[0].station.name, "Spens");
        assert_eq!(ranked[0].distance_meters, 0);
        assert!(ranked.windows(2).all(|w| w[0].distance_meters <= w[1].distance_meters));
    }
}
