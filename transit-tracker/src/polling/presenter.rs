//! Outbound port to whatever draws the tracker's state.

use crate::catalog::ProximityResult;
use crate::domain::{Coord, Station};
use crate::feed::FeedSnapshot;

use super::session::SessionStatus;

/// Receives everything the tracker wants shown to the rider.
///
/// Calls arrive from the controller task one at a time and must not block.
/// Messages passed to [`error`](Presenter::error) are always short,
/// human-readable text.
pub trait Presenter: Send + Sync + 'static {
    /// The station catalog was (re)loaded.
    fn catalog_refreshed(&self, stations: &[Station]);

    /// Stations around `origin` were ranked, nearest first.
    fn proximity_ranked(&self, origin: Coord, results: &[ProximityResult]);

    /// A new departures snapshot is ready. `recenter` is false for ticks.
    fn snapshot_ready(&self, snapshot: &FeedSnapshot, recenter: bool);

    /// Tracking was stopped; results should be hidden.
    fn session_stopped(&self);

    /// The polling session changed state.
    fn session_changed(&self, status: &SessionStatus);

    /// Something went wrong that the rider should know about.
    fn error(&self, message: &str);
}
