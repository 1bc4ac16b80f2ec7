//! The tracker: what the rider can ask for, in one place.
//!
//! [`Tracker`] ties the station catalog, the polling controller and the
//! presenter together. Searches are resolved and validated here before
//! anything reaches the controller; everything that fails is reported to
//! the presenter as well as returned.

use tracing::{debug, info};

use crate::catalog::{CatalogSource, ProximityResult, StationCatalog};
use crate::domain::{Fetched, InvalidInput, Query, SearchMode, Station};
use crate::geolocation::{GeolocationError, Geolocator};
use crate::polling::{ControllerClosed, ControllerHandle, Presenter};

/// Suggestions need at least this many characters of input.
pub const SUGGEST_MIN_CHARS: usize = 2;

/// Maximum number of suggestions returned.
pub const SUGGEST_LIMIT: usize = 5;

/// Error from a tracker operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    ControllerClosed(#[from] ControllerClosed),
}

/// Front door of the live-departure tracker.
pub struct Tracker<C, P> {
    catalog: StationCatalog<C>,
    controller: ControllerHandle,
    presenter: P,
}

impl<C: CatalogSource, P: Presenter> Tracker<C, P> {
    /// `presenter` should be the same presenter (or a clone sharing its
    /// state) that the controller behind `controller` renders to.
    pub fn new(catalog: StationCatalog<C>, controller: ControllerHandle, presenter: P) -> Self {
        Self {
            catalog,
            controller,
            presenter,
        }
    }

    pub fn catalog(&self) -> &StationCatalog<C> {
        &self.catalog
    }

    /// Reload the station catalog and show it.
    pub async fn refresh_catalog(&self) -> Fetched<Vec<Station>> {
        let fetched = self.catalog.refresh().await;
        self.presenter.catalog_refreshed(fetched.value());
        fetched
    }

    /// Resolve `input` for `mode` and start tracking the station it names.
    pub fn submit_search(&self, mode: SearchMode, input: &str) -> Result<Query, TrackerError> {
        let query = mode.resolve(input).map_err(|e| self.report(e))?;
        info!(?mode, %query, "search submitted");
        self.controller.search(query.clone())?;
        Ok(query)
    }

    /// Rank the catalog around the rider's position.
    pub async fn find_nearby<G: Geolocator>(
        &self,
        geolocator: &G,
        max_distance_meters: u32,
    ) -> Result<Vec<ProximityResult>, TrackerError> {
        let origin = geolocator
            .current_position()
            .await
            .map_err(|e| self.report(e))?;

        let results = self
            .catalog
            .rank_by_proximity(origin, max_distance_meters)
            .await;
        debug!(%origin, max_distance_meters, found = results.len(), "ranked nearby stations");

        self.presenter.proximity_ranked(origin, &results);
        Ok(results)
    }

    /// Catalog stations whose names contain `text`, for autocomplete.
    pub async fn suggest(&self, text: &str) -> Vec<Station> {
        let text = text.trim();
        if text.chars().count() < SUGGEST_MIN_CHARS {
            return Vec::new();
        }
        let mut matches = self.catalog.find_by_name_substring(text).await;
        matches.truncate(SUGGEST_LIMIT);
        matches
    }

    pub fn set_auto_refresh(&self, enabled: bool) -> Result<(), ControllerClosed> {
        self.controller.set_auto_refresh(enabled)
    }

    pub fn visibility_changed(&self, hidden: bool) -> Result<(), ControllerClosed> {
        self.controller.visibility_changed(hidden)
    }

    pub fn stop(&self) -> Result<(), ControllerClosed> {
        self.controller.stop()
    }

    pub fn refresh(&self) -> Result<(), ControllerClosed> {
        self.controller.refresh()
    }

    fn report<E: Into<TrackerError>>(&self, error: E) -> TrackerError {
        let error = error.into();
        self.presenter.error(&error.to_string());
        error
    }
}
