//! Web layer for the transit tracker.
//!
//! Serves the page, the departures fragment it polls, and the form
//! endpoints that feed rider actions into the tracker.

mod dto;
mod map;
mod presenter;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use map::{MapView, Marker, MarkerColor, Viewport};
pub use presenter::{Toast, ViewState, WebPresenter};
pub use routes::{AppError, create_router};
pub use state::{AppState, LivePlanner, LiveTracker};
