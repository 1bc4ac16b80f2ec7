//! The polling controller.
//!
//! A single task owns the [`PollingSession`] and handles one message at a
//! time to completion: commands from the UI, ticks from the armed timer,
//! and completions of departures fetches. Fetches run as separate tasks
//! and report back by message, so the controller itself never blocks.
//!
//! Every transition that can arm a timer goes through [`start`], which
//! always cancels the previous timer first.
//!
//! [`start`]: PollingController::start

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::Query;
use crate::feed::{DepartureFeed, DepartureSource, FeedError, FeedSnapshot};

use super::presenter::Presenter;
use super::session::{PollingSession, TimerHandle, TimerId};

/// Default time between polls of the tracked station.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Inbound commands from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Track a newly resolved station.
    SearchSubmitted(Query),
    /// The auto-refresh toggle changed.
    AutoRefreshToggled(bool),
    /// The page became hidden or visible.
    VisibilityChanged { hidden: bool },
    /// Stop tracking and hide results.
    StopRequested,
    /// Fetch once more for the tracked station without touching the timer.
    RefreshRequested,
}

/// What to do with a fetch that completes after its query stopped being
/// the tracked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResponsePolicy {
    /// Drop it; only responses for the tracked query are shown.
    #[default]
    Discard,
    /// Show whatever completes last, even for an abandoned query.
    LastWriteWins,
}

/// Configuration for the polling controller.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Time between polls while auto-refresh is on.
    pub interval: Duration,
    /// Initial state of the auto-refresh toggle.
    pub auto_refresh: bool,
    pub stale_responses: StaleResponsePolicy,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            auto_refresh: true,
            stale_responses: StaleResponsePolicy::default(),
        }
    }
}

/// Error returned when sending to a controller that has shut down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("polling controller is no longer running")]
pub struct ControllerClosed;

/// Cloneable sender of [`Command`]s to a running controller.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl ControllerHandle {
    pub fn send(&self, command: Command) -> Result<(), ControllerClosed> {
        self.commands.send(command).map_err(|_| ControllerClosed)
    }

    pub fn search(&self, query: Query) -> Result<(), ControllerClosed> {
        self.send(Command::SearchSubmitted(query))
    }

    pub fn set_auto_refresh(&self, enabled: bool) -> Result<(), ControllerClosed> {
        self.send(Command::AutoRefreshToggled(enabled))
    }

    pub fn visibility_changed(&self, hidden: bool) -> Result<(), ControllerClosed> {
        self.send(Command::VisibilityChanged { hidden })
    }

    pub fn stop(&self) -> Result<(), ControllerClosed> {
        self.send(Command::StopRequested)
    }

    pub fn refresh(&self) -> Result<(), ControllerClosed> {
        self.send(Command::RefreshRequested)
    }
}

/// Messages the controller sends itself.
#[derive(Debug)]
enum Event {
    Tick(TimerId),
    FetchCompleted {
        query: Query,
        recenter: bool,
        result: Result<FeedSnapshot, FeedError>,
    },
}

/// Owns the polling session and drives it from commands and timer ticks.
pub struct PollingController<S, P> {
    feed: Arc<DepartureFeed<S>>,
    presenter: P,
    session: PollingSession,
    config: PollingConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    events_tx: mpsc::UnboundedSender<Event>,
    events: mpsc::UnboundedReceiver<Event>,
}

impl<S: DepartureSource, P: Presenter> PollingController<S, P> {
    /// Create a controller and the handle used to command it.
    ///
    /// The controller does nothing until [`run`](Self::run) is awaited,
    /// typically on a spawned task.
    pub fn new(
        feed: DepartureFeed<S>,
        presenter: P,
        config: PollingConfig,
    ) -> (Self, ControllerHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();

        let controller = Self {
            feed: Arc::new(feed),
            presenter,
            session: PollingSession::new(config.auto_refresh),
            config,
            commands,
            events_tx,
            events,
        };

        (controller, ControllerHandle { commands: commands_tx })
    }

    pub fn session(&self) -> &PollingSession {
        &self.session
    }

    /// Process messages until every [`ControllerHandle`] is dropped.
    pub async fn run(mut self) {
        info!(interval = ?self.config.interval, "polling controller running");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(event) = self.events.recv() => self.on_event(event),
            }
        }
        self.session.disarm();
        info!("polling controller stopped");
    }

    /// Apply one inbound command.
    pub fn handle(&mut self, command: Command) {
        debug!(?command, "handling command");
        match command {
            Command::SearchSubmitted(query) => self.start(query),
            Command::AutoRefreshToggled(enabled) => self.toggle_auto_refresh(enabled),
            Command::VisibilityChanged { hidden } => self.on_visibility_change(hidden),
            Command::StopRequested => self.stop(),
            Command::RefreshRequested => {
                if let Some(query) = self.session.current_query().cloned() {
                    self.spawn_fetch(query, false);
                }
            }
        }
    }

    /// Track `query`: fetch it once now and, with auto-refresh on, poll it
    /// on a fresh timer.
    pub fn start(&mut self, query: Query) {
        self.session.disarm();
        self.session.set_query(query.clone());
        info!(%query, "tracking departures");

        self.spawn_fetch(query, true);
        if self.session.auto_refresh() {
            self.arm_timer();
        }
        self.publish_status();
    }

    /// Stop tracking: cancel the timer, forget the query, hide results.
    pub fn stop(&mut self) {
        let had_timer = self.session.disarm();
        let query = self.session.clear_query();
        info!(?query, had_timer, "stopped tracking");

        self.presenter.session_stopped();
        self.publish_status();
    }

    pub fn toggle_auto_refresh(&mut self, enabled: bool) {
        self.session.set_auto_refresh(enabled);

        match self.session.current_query().cloned() {
            Some(query) if enabled => self.start(query),
            Some(_) => {
                self.session.disarm();
                self.publish_status();
            }
            None => self.publish_status(),
        }
    }

    /// Suspend polling while hidden; restart it with a fresh fetch when the
    /// page is shown again. Only relevant while auto-refresh is on.
    pub fn on_visibility_change(&mut self, hidden: bool) {
        self.session.set_hidden(hidden);
        if !self.session.auto_refresh() {
            return;
        }

        if hidden {
            if self.session.disarm() {
                debug!("page hidden, polling suspended");
            }
            self.publish_status();
        } else if let Some(query) = self.session.current_query().cloned() {
            self.start(query);
        }
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Tick(timer) => self.on_tick(timer),
            Event::FetchCompleted {
                query,
                recenter,
                result,
            } => self.on_fetch_completed(query, recenter, result),
        }
    }

    fn on_tick(&mut self, timer: TimerId) {
        if self.session.armed_timer() != Some(timer) {
            debug!(%timer, "ignoring tick from cancelled timer");
            return;
        }
        if let Some(query) = self.session.current_query().cloned() {
            debug!(%timer, %query, "tick");
            self.spawn_fetch(query, false);
        }
    }

    fn on_fetch_completed(
        &mut self,
        query: Query,
        recenter: bool,
        result: Result<FeedSnapshot, FeedError>,
    ) {
        let is_current = self.session.current_query() == Some(&query);
        if !is_current && self.config.stale_responses == StaleResponsePolicy::Discard {
            debug!(%query, "discarding response for a query no longer tracked");
            return;
        }

        match result {
            Ok(snapshot) => self.presenter.snapshot_ready(&snapshot, recenter),
            // A failed fetch is reported but leaves the timer running.
            Err(e) => {
                warn!(%query, error = %e.source, "departures fetch failed");
                self.presenter.error(&e.to_string());
            }
        }
    }

    fn spawn_fetch(&self, query: Query, recenter: bool) {
        let feed = Arc::clone(&self.feed);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let result = feed.fetch(&query).await;
            // The controller may have shut down while we were fetching.
            let _ = events.send(Event::FetchCompleted {
                query,
                recenter,
                result,
            });
        });
    }

    fn arm_timer(&mut self) {
        let id = self.session.next_timer_id();
        let period = self.config.interval;
        let events = self.events_tx.clone();

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(Event::Tick(id)).is_err() {
                    break;
                }
            }
        });

        debug!(timer = %id, "armed poll timer");
        self.session.arm(TimerHandle::new(id, task.abort_handle()));
    }

    fn publish_status(&self) {
        self.presenter.session_changed(&self.session.status());
    }
}
