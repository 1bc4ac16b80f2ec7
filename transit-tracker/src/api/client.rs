//! Transit API HTTP client.
//!
//! Talks to the city's live stations API: the full station listing and
//! the per-station departures board.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{DepartureSnapshot, Query, Station};

use super::convert::{convert_board, convert_stations};
use super::error::ApiError;
use super::types::{DepartureBoardDto, StationDto};

/// Default base URL for the transit API.
pub const DEFAULT_BASE_URL: &str = "https://bgpp.fly.dev";

/// Default city code (Novi Sad).
pub const DEFAULT_CITY_CODE: &str = "ns";

/// Configuration for the transit API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the API
    pub base_url: String,
    /// City code used in every endpoint path
    pub city_code: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a config for the given city with the default base URL.
    pub fn new(city_code: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            city_code: city_code.into(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CITY_CODE)
    }
}

/// Client for the transit stations API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    city_code: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            city_code: config.city_code,
        })
    }

    pub fn city_code(&self) -> &str {
        &self.city_code
    }

    fn stations_url(&self, endpoint: &str) -> String {
        format!("{}/api/stations/{}/{}", self.base_url, self.city_code, endpoint)
    }

    /// Fetch every station in the city.
    pub async fn fetch_all_stations(&self) -> Result<Vec<Station>, ApiError> {
        let url = self.stations_url("all");
        let stations: Vec<StationDto> = self.get_json(self.http.get(&url)).await?;

        debug!(count = stations.len(), "fetched station listing");
        Ok(convert_stations(stations))
    }

    /// Fetch the live departures board for a station.
    pub async fn fetch_departures(&self, query: &Query) -> Result<DepartureSnapshot, ApiError> {
        let url = self.stations_url("search");
        let board: DepartureBoardDto = self
            .get_json(self.http.get(&url).query(&query.params()))
            .await?;

        convert_board(board).map_err(|e| ApiError::InvalidData {
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ApiError::Json {
            message: e.to_string(),
        })
    }
}
