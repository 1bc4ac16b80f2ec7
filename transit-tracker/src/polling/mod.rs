//! Live-departure polling.
//!
//! A [`PollingController`] owns the one [`PollingSession`] of a tracker
//! and moves it between idle, fetched-once, polling and suspended in
//! response to [`Command`]s. Everything it wants shown goes out through a
//! [`Presenter`].

mod controller;
mod presenter;
mod session;

pub use controller::{
    Command, ControllerClosed, ControllerHandle, DEFAULT_REFRESH_INTERVAL, PollingConfig,
    PollingController, StaleResponsePolicy,
};
pub use presenter::Presenter;
pub use session::{PollingSession, SessionState, SessionStatus, TimerHandle, TimerId};

#[cfg(test)]
pub(crate) use presenter::testing;
