//! Presenter that keeps the page state for the web frontend.
//!
//! The controller pushes updates in; request handlers read a copy out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;
use tracing::debug;

use crate::catalog::ProximityResult;
use crate::domain::{Coord, Station};
use crate::feed::FeedSnapshot;
use crate::polling::{Presenter, SessionState, SessionStatus};
use crate::trips::TripPlan;

use super::map::MapView;

/// An error message that disappears after a while.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// What the page currently shows.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub stations: Vec<Station>,
    pub nearby: Vec<ProximityResult>,
    /// Latest departures, `None` when nothing is tracked.
    pub snapshot: Option<FeedSnapshot>,
    pub last_updated: Option<DateTime<Local>>,
    pub status: SessionStatus,
    pub trip: Option<TripPlan>,
    pub map: MapView,
    pub error: Option<Toast>,
}

impl ViewState {
    fn new(center: Coord, zoom: u8) -> Self {
        Self {
            stations: Vec::new(),
            nearby: Vec::new(),
            snapshot: None,
            last_updated: None,
            status: SessionStatus {
                state: SessionState::Idle,
                query: None,
                auto_refresh: true,
            },
            trip: None,
            map: MapView::new(center, zoom),
            error: None,
        }
    }

    /// The error message, if it has not expired yet.
    pub fn visible_error(&self) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|t| t.expires_at > Instant::now())
            .map(|t| t.message.as_str())
    }
}

/// Shared, cloneable page state.
#[derive(Clone)]
pub struct WebPresenter {
    view: Arc<Mutex<ViewState>>,
    error_display: Duration,
}

impl WebPresenter {
    pub fn new(center: Coord, zoom: u8, error_display: Duration) -> Self {
        Self {
            view: Arc::new(Mutex::new(ViewState::new(center, zoom))),
            error_display,
        }
    }

    /// A copy of the current page state, with expired errors dropped.
    pub fn view(&self) -> ViewState {
        let mut view = self.lock().clone();
        if view.visible_error().is_none() {
            view.error = None;
        }
        view
    }

    /// Show trip results in place of departures.
    pub fn show_trip(&self, plan: &TripPlan) {
        let mut view = self.lock();
        view.map.show_trip(plan);
        view.trip = Some(plan.clone());
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Presenter for WebPresenter {
    fn catalog_refreshed(&self, stations: &[Station]) {
        self.lock().stations = stations.to_vec();
    }

    fn proximity_ranked(&self, origin: Coord, results: &[ProximityResult]) {
        let mut view = self.lock();
        view.map.show_ranking(origin, results);
        view.nearby = results.to_vec();
    }

    fn snapshot_ready(&self, snapshot: &FeedSnapshot, recenter: bool) {
        let mut view = self.lock();
        view.map.show_snapshot(snapshot.value(), recenter);
        view.snapshot = Some(snapshot.clone());
        view.last_updated = Some(Local::now());
        view.trip = None;
    }

    fn session_stopped(&self) {
        let mut view = self.lock();
        view.snapshot = None;
        view.last_updated = None;
        view.map.clear();
    }

    fn session_changed(&self, status: &SessionStatus) {
        self.lock().status = status.clone();
    }

    fn error(&self, message: &str) {
        debug!(message, "showing error");
        self.lock().error = Some(Toast {
            message: message.to_string(),
            expires_at: Instant::now() + self.error_display,
        });
    }
}
