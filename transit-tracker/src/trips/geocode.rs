//! Place-name geocoding for trip endpoints.
//!
//! Names are looked up with Nominatim, scoped to Novi Sad. Successful
//! lookups are cached; when Nominatim fails or knows nothing, the first
//! catalog station whose name contains the text stands in, and failing
//! that the map centre.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::catalog::{CatalogSource, StationCatalog};
use crate::domain::Coord;

/// Appended to every query to keep matches inside the city.
const SEARCH_SUFFIX: &str = ", Novi Sad, Serbia";

/// Trait for turning a place name into a position.
///
/// Implementations always produce a coordinate, falling back to some
/// sensible default when the name cannot be found.
pub trait Geocode: Send + Sync {
    fn locate(&self, name: &str) -> impl Future<Output = Coord> + Send;
}

/// Configuration for the geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim instance.
    pub base_url: String,
    /// Position used when nothing else matches.
    pub default_coords: Coord,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// TTL for cached lookups.
    pub ttl: Duration,
    /// Maximum number of cached lookups.
    pub max_capacity: u64,
}

impl GeocoderConfig {
    pub fn new(base_url: impl Into<String>, default_coords: Coord) -> Self {
        Self {
            base_url: base_url.into(),
            default_coords,
            timeout_secs: 30,
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 500,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// One Nominatim search hit. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Nominatim-backed geocoder with catalog fallback.
pub struct Geocoder<S> {
    http: reqwest::Client,
    base_url: String,
    cache: MokaCache<String, Coord>,
    catalog: StationCatalog<S>,
    default_coords: Coord,
}

impl<S: CatalogSource> Geocoder<S> {
    pub fn new(config: GeocoderConfig, catalog: StationCatalog<S>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("transit-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
            catalog,
            default_coords: config.default_coords,
        })
    }

    /// Ask Nominatim for `name`. `Ok(None)` means no match.
    async fn search(&self, name: &str) -> Result<Option<Coord>, ApiError> {
        let url = format!("{}/search", self.base_url);
        let q = format!("{name}{SEARCH_SUFFIX}");

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("q", q.as_str()), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let places: Vec<Place> = response.json().await.map_err(|e| ApiError::Json {
            message: e.to_string(),
        })?;

        places
            .first()
            .map(|place| {
                let lat = place.lat.parse::<f64>();
                let lon = place.lon.parse::<f64>();
                match (lat, lon) {
                    (Ok(lat), Ok(lon)) => Coord::new(lat, lon).map_err(|e| ApiError::InvalidData {
                        message: e.to_string(),
                    }),
                    _ => Err(ApiError::InvalidData {
                        message: format!("unparseable position {:?}, {:?}", place.lat, place.lon),
                    }),
                }
            })
            .transpose()
    }

    /// Position of the first catalog station whose name contains `name`.
    async fn catalog_match(&self, name: &str) -> Option<Coord> {
        self.catalog
            .find_by_name_substring(name)
            .await
            .first()
            .map(|station| station.coords)
    }
}

impl<S: CatalogSource> Geocode for Geocoder<S> {
    async fn locate(&self, name: &str) -> Coord {
        let key = name.trim().to_lowercase();
        if let Some(coords) = self.cache.get(&key).await {
            return coords;
        }

        match self.search(name.trim()).await {
            Ok(Some(coords)) => {
                debug!(name, %coords, "geocoded");
                self.cache.insert(key, coords).await;
                return coords;
            }
            Ok(None) => debug!(name, "no geocoding match"),
            Err(e) => warn!(name, error = %e, "geocoding failed"),
        }

        self.catalog_match(name.trim())
            .await
            .unwrap_or(self.default_coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{ScriptedSource, station};
    use crate::domain::NOVI_SAD_CENTER;

    async fn offline_geocoder() -> Geocoder<ScriptedSource> {
        let catalog = StationCatalog::new(ScriptedSource::new(vec![Ok(vec![
            station("10", "Liman 4", 45.2390, 19.8410),
            station("11", "Spens", 45.2480, 19.8450),
        ])]));
        catalog.refresh().await;

        let config = GeocoderConfig::new("http://127.0.0.1:9", NOVI_SAD_CENTER).with_timeout(2);
        Geocoder::new(config, catalog).unwrap()
    }

    #[tokio::test]
    async fn unreachable_service_falls_back_to_catalog() {
        let geocoder = offline_geocoder().await;

        let coords = geocoder.locate("spens").await;
        assert_eq!(coords, Coord::new(45.2480, 19.8450).unwrap());
    }

    #[tokio::test]
    async fn unknown_name_falls_back_to_center() {
        let geocoder = offline_geocoder().await;

        assert_eq!(geocoder.locate("Petrovaradin").await, NOVI_SAD_CENTER);
    }

    #[tokio::test]
    async fn cached_positions_are_reused() {
        let geocoder = offline_geocoder().await;
        let cached = Coord::new(45.2516, 19.8620).unwrap();
        geocoder.cache.insert("petrovaradin".to_string(), cached).await;

        assert_eq!(geocoder.locate("  Petrovaradin ").await, cached);
    }
}
