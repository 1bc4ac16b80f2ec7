//! The polling session: which station is tracked and whether a timer runs.

use std::fmt;

use serde::Serialize;
use tokio::task::AbortHandle;

use crate::domain::Query;

/// Identifies one armed timer. Ticks carry the id of the timer that sent
/// them so ticks from a replaced timer can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Owning handle to a repeating poll timer.
///
/// Dropping the handle cancels the timer task.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    task: AbortHandle,
}

impl TimerHandle {
    pub fn new(id: TimerId, task: AbortHandle) -> Self {
        Self { id, task }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing tracked.
    Idle,
    /// A station is tracked but not polled.
    ActiveOnce,
    /// A station is tracked and polled on a timer.
    ActivePolling,
    /// Polling paused while the page is hidden.
    Suspended,
}

/// Summary of the session for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub query: Option<Query>,
    pub auto_refresh: bool,
}

/// The single mutable record behind the polling controller.
///
/// Invariant: `timer` is `Some` iff a repeating poll is armed, and a new
/// timer is only ever installed after the previous one has been dropped.
#[derive(Debug)]
pub struct PollingSession {
    current_query: Option<Query>,
    timer: Option<TimerHandle>,
    auto_refresh: bool,
    hidden: bool,
    next_timer: u64,
}

impl PollingSession {
    pub fn new(auto_refresh: bool) -> Self {
        Self {
            current_query: None,
            timer: None,
            auto_refresh,
            hidden: false,
            next_timer: 0,
        }
    }

    pub fn current_query(&self) -> Option<&Query> {
        self.current_query.as_ref()
    }

    pub fn set_query(&mut self, query: Query) {
        self.current_query = Some(query);
    }

    pub fn clear_query(&mut self) -> Option<Query> {
        self.current_query.take()
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Reserve the id for the next timer to be armed.
    pub fn next_timer_id(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    /// Install `timer`, cancelling any timer already armed.
    pub fn arm(&mut self, timer: TimerHandle) {
        self.disarm();
        self.timer = Some(timer);
    }

    /// Cancel the armed timer. Returns whether one was armed.
    pub fn disarm(&mut self) -> bool {
        self.timer.take().is_some()
    }

    pub fn armed_timer(&self) -> Option<TimerId> {
        self.timer.as_ref().map(TimerHandle::id)
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn state(&self) -> SessionState {
        match (&self.current_query, self.is_armed()) {
            (None, _) => SessionState::Idle,
            (Some(_), true) => SessionState::ActivePolling,
            (Some(_), false) if self.auto_refresh && self.hidden => SessionState::Suspended,
            (Some(_), false) => SessionState::ActiveOnce,
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state(),
            query: self.current_query.clone(),
            auto_refresh: self.auto_refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_task() -> tokio::task::JoinHandle<()> {
        tokio::spawn(std::future::pending::<()>())
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    fn timer(session: &mut PollingSession, task: &tokio::task::JoinHandle<()>) -> TimerHandle {
        TimerHandle::new(session.next_timer_id(), task.abort_handle())
    }

    #[tokio::test]
    async fn arming_replaces_and_cancels_previous() {
        let mut session = PollingSession::new(true);

        let first_task = idle_task();
        let first = timer(&mut session, &first_task);
        let first_id = first.id();
        session.arm(first);

        let second_task = idle_task();
        let second = timer(&mut session, &second_task);
        let second_id = second.id();
        session.arm(second);

        assert_ne!(first_id, second_id);
        assert_eq!(session.armed_timer(), Some(second_id));

        settle().await;
        assert!(first_task.is_finished());
        assert!(!second_task.is_finished());
    }

    #[tokio::test]
    async fn disarm_cancels() {
        let mut session = PollingSession::new(true);
        let task = idle_task();
        let handle = timer(&mut session, &task);
        session.arm(handle);

        assert!(session.disarm());
        assert!(!session.disarm());
        assert!(!session.is_armed());

        settle().await;
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn states() {
        let mut session = PollingSession::new(true);
        assert_eq!(session.state(), SessionState::Idle);

        session.set_query(Query::by_id("1").unwrap());
        assert_eq!(session.state(), SessionState::ActiveOnce);

        let task = idle_task();
        let handle = timer(&mut session, &task);
        session.arm(handle);
        assert_eq!(session.state(), SessionState::ActivePolling);

        session.set_hidden(true);
        session.disarm();
        assert_eq!(session.state(), SessionState::Suspended);

        session.set_auto_refresh(false);
        assert_eq!(session.state(), SessionState::ActiveOnce);

        session.clear_query();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn status_reflects_fields() {
        let mut session = PollingSession::new(false);
        session.set_query(Query::by_catalog_selection("u1").unwrap());

        let status = session.status();
        assert_eq!(status.state, SessionState::ActiveOnce);
        assert_eq!(status.query, Some(Query::ByUid { uid: "u1".into() }));
        assert!(!status.auto_refresh);
    }
}
