//! Where the rider is.
//!
//! The position comes from the browser; the page posts either the fix or
//! the reason it could not get one, and [`ReportedFix`] turns that report
//! into a [`Geolocator`] answer.

use std::future::Future;

use crate::domain::Coord;

/// Why no position is available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by this browser")]
    Unsupported,
    #[error("Location permission was denied")]
    PermissionDenied,
    #[error("Failed to get your location")]
    Unavailable,
}

impl GeolocationError {
    /// Map a browser error code (`"unsupported"`, `"denied"`, ...) to an
    /// error. Unknown codes count as unavailable.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "unsupported" => GeolocationError::Unsupported,
            "denied" | "permission_denied" => GeolocationError::PermissionDenied,
            _ => GeolocationError::Unavailable,
        }
    }
}

/// Source of the rider's current position.
pub trait Geolocator: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coord, GeolocationError>> + Send;
}

/// A position (or the failure to get one) reported by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedFix(Result<Coord, GeolocationError>);

impl ReportedFix {
    pub fn new(fix: Result<Coord, GeolocationError>) -> Self {
        Self(fix)
    }

    /// Build a fix from raw report fields.
    ///
    /// An error code wins over coordinates. Missing or out-of-range
    /// coordinates are treated as an unavailable position rather than
    /// guessed at.
    pub fn from_report(lat: Option<f64>, lon: Option<f64>, error: Option<&str>) -> Self {
        if let Some(code) = error.filter(|c| !c.trim().is_empty()) {
            return Self(Err(GeolocationError::from_code(code)));
        }
        let fix = match (lat, lon) {
            (Some(lat), Some(lon)) => {
                Coord::new(lat, lon).map_err(|_| GeolocationError::Unavailable)
            }
            _ => Err(GeolocationError::Unavailable),
        };
        Self(fix)
    }
}

impl Geolocator for ReportedFix {
    async fn current_position(&self) -> Result<Coord, GeolocationError> {
        self.0.clone()
    }
}
