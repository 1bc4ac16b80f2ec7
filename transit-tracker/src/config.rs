//! Application configuration.
//!
//! Read once at startup from `TRANSIT_*` environment variables; anything
//! unset keeps its default.

use std::net::SocketAddr;
use std::time::Duration;

use crate::api::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_CITY_CODE};
use crate::domain::{Coord, NOVI_SAD_CENTER};
use crate::feed::FeedConfig;
use crate::polling::{DEFAULT_REFRESH_INTERVAL, PollingConfig, StaleResponsePolicy};

/// Map zoom used when centring on a single station.
pub const DEFAULT_ZOOM: u8 = 13;

/// How long an error message stays on screen.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);

/// Default radius for nearby-station searches, in metres.
pub const DEFAULT_RADIUS_METERS: u32 = 500;

/// Default public Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LISTEN: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything the tracker needs to know at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the transit API.
    pub api_url: String,
    pub city_code: String,
    /// Time between departures polls.
    pub refresh_interval: Duration,
    pub stale_responses: StaleResponsePolicy,
    /// Address the web server binds to.
    pub listen: SocketAddr,
    /// Base URL of the Nominatim geocoder.
    pub geocoder_url: String,
    /// Request timeout for outbound HTTP, in seconds.
    pub http_timeout_secs: u64,
    pub map_center: Coord,
    pub default_zoom: u8,
    pub error_display: Duration,
    pub default_radius_meters: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            city_code: DEFAULT_CITY_CODE.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            stale_responses: StaleResponsePolicy::default(),
            listen: SocketAddr::from(DEFAULT_LISTEN),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            map_center: NOVI_SAD_CENTER,
            default_zoom: DEFAULT_ZOOM,
            error_display: ERROR_DISPLAY,
            default_radius_meters: DEFAULT_RADIUS_METERS,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to read variables. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("TRANSIT_API_URL") {
            config = config.with_api_url(parse_url("TRANSIT_API_URL", &url)?);
        }
        if let Some(city) = get("TRANSIT_CITY") {
            config = config.with_city_code(city.trim());
        }
        if let Some(ms) = get("TRANSIT_REFRESH_MS") {
            config = config.with_refresh_interval(parse_interval(&ms)?);
        }
        if let Some(policy) = get("TRANSIT_STALE_RESPONSES") {
            config = config.with_stale_responses(parse_policy(&policy)?);
        }
        if let Some(listen) = get("TRANSIT_LISTEN") {
            let addr = listen
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("TRANSIT_LISTEN", &listen, e))?;
            config = config.with_listen(addr);
        }
        if let Some(url) = get("TRANSIT_GEOCODER_URL") {
            config = config.with_geocoder_url(parse_url("TRANSIT_GEOCODER_URL", &url)?);
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_city_code(mut self, city: impl Into<String>) -> Self {
        self.city_code = city.into();
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_stale_responses(mut self, policy: StaleResponsePolicy) -> Self {
        self.stale_responses = policy;
        self
    }

    pub fn with_listen(mut self, addr: SocketAddr) -> Self {
        self.listen = addr;
        self
    }

    pub fn with_geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.geocoder_url = url.into();
        self
    }

    /// Transit API client settings.
    pub fn api(&self) -> ApiConfig {
        ApiConfig::new(&self.city_code)
            .with_base_url(&self.api_url)
            .with_timeout(self.http_timeout_secs)
    }

    pub fn feed(&self) -> FeedConfig {
        FeedConfig::new(self.map_center)
    }

    pub fn polling(&self) -> PollingConfig {
        PollingConfig {
            interval: self.refresh_interval,
            auto_refresh: true,
            stale_responses: self.stale_responses,
        }
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(url.to_string()),
        Ok(_) => Err(ConfigError::invalid(var, raw, "expected an http(s) URL")),
        Err(e) => Err(ConfigError::invalid(var, raw, e)),
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid("TRANSIT_REFRESH_MS", raw, e))?;
    if ms == 0 {
        return Err(ConfigError::invalid(
            "TRANSIT_REFRESH_MS",
            raw,
            "interval must be positive",
        ));
    }
    Ok(Duration::from_millis(ms))
}

fn parse_policy(raw: &str) -> Result<StaleResponsePolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "discard" => Ok(StaleResponsePolicy::Discard),
        "last-write-wins" => Ok(StaleResponsePolicy::LastWriteWins),
        _ => Err(ConfigError::invalid(
            "TRANSIT_STALE_RESPONSES",
            raw,
            "expected \"discard\" or \"last-write-wins\"",
        )),
    }
}
