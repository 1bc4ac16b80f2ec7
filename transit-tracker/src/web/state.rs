//! Application state for the web layer.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::app::Tracker;
use crate::config::AppConfig;
use crate::trips::{Geocoder, TripPlanner};

use super::presenter::WebPresenter;

/// The tracker as served: live API behind it, rendering to the page state.
pub type LiveTracker = Tracker<ApiClient, WebPresenter>;

/// Trip planner geocoding through Nominatim and the live catalog.
pub type LivePlanner = TripPlanner<Geocoder<ApiClient>>;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<LiveTracker>,

    /// Page state the controller renders into
    pub presenter: WebPresenter,

    pub planner: Arc<LivePlanner>,

    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        tracker: LiveTracker,
        presenter: WebPresenter,
        planner: LivePlanner,
        config: AppConfig,
    ) -> Self {
        Self {
            tracker: Arc::new(tracker),
            presenter,
            planner: Arc::new(planner),
            config: Arc::new(config),
        }
    }
}
