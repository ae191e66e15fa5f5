use crate::domain::{category, ActiveSession, Category, SessionState, TimeEntry};
use chrono::{DateTime, Local};

/// Outcome of a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing was running; the requested category started
    Started(ActiveSession),
    /// The requested category was running and has been stopped
    Stopped(TimeEntry),
    /// Another category was running; it was stopped and the requested one started
    Switched {
        stopped: TimeEntry,
        started: ActiveSession,
    },
    /// Unknown category while idle; nothing changed
    Ignored,
}

impl Transition {
    /// The entry closed by this transition, if any
    pub fn stopped(&self) -> Option<&TimeEntry> {
        match self {
            Self::Stopped(entry) | Self::Switched { stopped: entry, .. } => Some(entry),
            Self::Started(_) | Self::Ignored => None,
        }
    }

    /// The session opened by this transition, if any
    pub fn started(&self) -> Option<&ActiveSession> {
        match self {
            Self::Started(session) | Self::Switched { started: session, .. } => Some(session),
            Self::Stopped(_) | Self::Ignored => None,
        }
    }
}

/// State machine for the single tracking session
#[derive(Debug, Clone)]
pub struct SessionController {
    categories: &'static [Category],
    state: SessionState,
}

impl SessionController {
    pub fn new(categories: &'static [Category]) -> Self {
        Self {
            categories,
            state: SessionState::NoSession,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.state.active()
    }

    /// Resume a session recovered from disk
    pub fn restore(&mut self, session: ActiveSession) {
        self.state = SessionState::Active(session);
    }

    /// Start tracking `name`. No-op (returns `None`) if a session is already
    /// running or the category is unknown.
    pub fn start(&mut self, name: &str, now: DateTime<Local>) -> Option<ActiveSession> {
        if self.state.is_active() {
            return None;
        }
        let category = category::find(self.categories, name)?;

        let session = ActiveSession::new(category.name, now);
        self.state = SessionState::Active(session.clone());
        Some(session)
    }

    /// Stop the running session, closing it at `now`. No-op when idle.
    pub fn stop(&mut self, now: DateTime<Local>) -> Option<TimeEntry> {
        match std::mem::take(&mut self.state) {
            SessionState::Active(session) => Some(session.close(now)),
            SessionState::NoSession => None,
        }
    }

    /// Stop whatever is running, then start `name` unless it was the one just stopped
    pub fn toggle(&mut self, name: &str, now: DateTime<Local>) -> Transition {
        let stopped = self.stop(now);

        match stopped {
            Some(entry) if entry.category == name => Transition::Stopped(entry),
            Some(entry) => match self.start(name, now) {
                Some(started) => Transition::Switched {
                    stopped: entry,
                    started,
                },
                None => Transition::Stopped(entry),
            },
            None => match self.start(name, now) {
                Some(started) => Transition::Started(started),
                None => Transition::Ignored,
            },
        }
    }
}
