use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A completed tracking interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub category: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

impl TimeEntry {
    /// Create an entry, clamping `end_time` so it never precedes `start_time`
    pub fn new(category: impl Into<String>, start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self {
            category: category.into(),
            start_time,
            end_time: end_time.max(start_time),
        }
    }

    /// Length of the interval
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// The calendar day this entry is attributed to (the day it started)
    pub fn day(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

/// The session currently being tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub category: String,
    pub start_time: DateTime<Local>,
}

impl ActiveSession {
    pub fn new(category: impl Into<String>, start_time: DateTime<Local>) -> Self {
        Self {
            category: category.into(),
            start_time,
        }
    }

    /// Time elapsed since the session started (never negative)
    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        (now - self.start_time).max(Duration::zero())
    }

    /// Close the session into a completed entry ending at `end_time`
    pub fn close(&self, end_time: DateTime<Local>) -> TimeEntry {
        TimeEntry::new(self.category.clone(), self.start_time, end_time)
    }
}

/// Whether a session is in progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    NoSession,
    Active(ActiveSession),
}

impl SessionState {
    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            Self::Active(session) => Some(session),
            Self::NoSession => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Name of the running category, if any
    pub fn category(&self) -> Option<&str> {
        self.active().map(|s| s.category.as_str())
    }
}
