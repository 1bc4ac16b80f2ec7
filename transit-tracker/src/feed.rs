//! Live departures feed with offline fallback.
//!
//! A fetch never leaves the rider with nothing to look at: when the
//! departures endpoint cannot be reached or returns garbage, the feed
//! answers with a synthetic snapshot tagged as a fallback.

use std::future::Future;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, synthetic_snapshot};
use crate::domain::{Coord, DepartureSnapshot, Fetched, Query};

/// A snapshot tagged with whether it is live or synthesized.
pub type FeedSnapshot = Fetched<DepartureSnapshot>;

/// Trait for providing live departures.
///
/// This abstraction allows the feed and polling controller to be tested
/// with mock data.
pub trait DepartureSource: Send + Sync + 'static {
    /// Fetch the current departures board for the station `query` names.
    fn fetch_departures(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<DepartureSnapshot, ApiError>> + Send;
}

impl DepartureSource for ApiClient {
    async fn fetch_departures(&self, query: &Query) -> Result<DepartureSnapshot, ApiError> {
        ApiClient::fetch_departures(self, query).await
    }
}

/// A departures fetch that failed with fallback disabled.
#[derive(Debug, thiserror::Error)]
#[error("Failed to update departures: {source}")]
pub struct FeedError {
    pub query: Query,
    #[source]
    pub source: ApiError,
}

/// Configuration for the departures feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Substitute a synthetic snapshot when the source fails.
    pub fallback_on_error: bool,
    /// Where to place synthetic snapshots of unknown stations.
    pub default_coords: Coord,
}

impl FeedConfig {
    pub fn new(default_coords: Coord) -> Self {
        Self {
            fallback_on_error: true,
            default_coords,
        }
    }

    /// Propagate source errors instead of substituting synthetic data.
    pub fn without_fallback(mut self) -> Self {
        self.fallback_on_error = false;
        self
    }
}

/// Fetches departure snapshots from a [`DepartureSource`].
pub struct DepartureFeed<S> {
    source: S,
    config: FeedConfig,
}

impl<S: DepartureSource> DepartureFeed<S> {
    pub fn new(source: S, config: FeedConfig) -> Self {
        Self { source, config }
    }

    /// Fetch a snapshot for `query`.
    ///
    /// With fallback enabled (the default) this never returns `Err`.
    pub async fn fetch(&self, query: &Query) -> Result<FeedSnapshot, FeedError> {
        match self.source.fetch_departures(query).await {
            Ok(snapshot) => {
                debug!(%query, vehicles = snapshot.vehicles.len(), "fetched departures");
                Ok(Fetched::live(snapshot))
            }
            Err(e) if self.config.fallback_on_error => {
                warn!(%query, error = %e, "departures unavailable, using synthetic snapshot");
                let snapshot = synthetic_snapshot(query, self.config.default_coords);
                Ok(Fetched::fallback(snapshot, e.to_string()))
            }
            Err(source) => Err(FeedError {
                query: query.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::domain::Vehicle;

    #[derive(Default)]
    struct Script {
        failing: bool,
        delays: HashMap<Query, Duration>,
        calls: Vec<Query>,
    }

    /// Departure source with switchable failures, per-query latency and a
    /// call log. Clones share state.
    #[derive(Clone, Default)]
    pub struct FakeSource {
        script: Arc<Mutex<Script>>,
    }

    impl FakeSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.script.lock().unwrap().failing = failing;
        }

        /// Delay responses for `query` by `delay` (tokio time).
        pub fn set_delay(&self, query: &Query, delay: Duration) {
            self.script
                .lock()
                .unwrap()
                .delays
                .insert(query.clone(), delay);
        }

        pub fn calls(&self) -> Vec<Query> {
            self.script.lock().unwrap().calls.clone()
        }

        pub fn call_count(&self) -> usize {
            self.script.lock().unwrap().calls.len()
        }
    }

    /// A live snapshot whose station name echoes the query.
    pub fn live_snapshot(query: &Query) -> DepartureSnapshot {
        DepartureSnapshot {
            station_id: "1203".into(),
            station_name: format!("live {query}"),
            coords: Coord::new(45.2551, 19.8452).unwrap(),
            vehicles: vec![Vehicle {
                line_number: "4".into(),
                seconds_left: 120,
                stations_between: 2,
                station_name: Some("Spens".into()),
                garage_no: "P-733".into(),
                coords: Coord::new(45.2480, 19.8450).ok(),
            }],
        }
    }

    impl DepartureSource for FakeSource {
        async fn fetch_departures(&self, query: &Query) -> Result<DepartureSnapshot, ApiError> {
            let (failing, delay) = {
                let mut script = self.script.lock().unwrap();
                script.calls.push(query.clone());
                (script.failing, script.delays.get(query).copied())
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if failing {
                return Err(ApiError::Api {
                    status: 503,
                    message: "Service Unavailable".into(),
                });
            }
            Ok(live_snapshot(query))
        }
    }
}
