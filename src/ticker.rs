use crate::config::Settings;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Periodic work the main loop dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Refresh the live elapsed-time label
    Display,
    /// Save entries and the session file
    Autosave,
    /// Check whether the day has rolled over
    DayCheck,
}

/// A single repeating timer that can be switched on and off
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last_fired: Instant,
    enabled: bool,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fired: now,
            enabled: true,
        }
    }

    /// Start counting from `now`; no-op if already running
    pub fn enable(&mut self, now: Instant) {
        if !self.enabled {
            self.enabled = true;
            self.last_fired = now;
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether the interval elapsed; resets the timer when it did
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if !self.enabled || now.duration_since(self.last_fired) < self.interval {
            return false;
        }
        self.last_fired = now;
        true
    }
}

/// The three timers of the tracker. Autosave and day-check always run; the
/// display timer only runs while a session is active.
#[derive(Debug, Clone)]
pub struct Scheduler {
    display: Ticker,
    autosave: Ticker,
    day_check: Ticker,
}

impl Scheduler {
    pub fn new(settings: &Settings, now: Instant) -> Self {
        let mut display = Ticker::new(settings.display_interval, now);
        display.disable();

        Self {
            display,
            autosave: Ticker::new(settings.autosave_interval, now),
            day_check: Ticker::new(settings.day_check_interval, now),
        }
    }

    /// Tie the display timer to whether a session is running
    pub fn set_session_active(&mut self, active: bool, now: Instant) {
        if active {
            self.display.enable(now);
        } else {
            self.display.disable();
        }
    }

    /// Ticks due at `now`, in dispatch order
    pub fn due(&mut self, now: Instant) -> Vec<Tick> {
        let mut ticks = Vec::new();
        if self.display.fire_if_due(now) {
            ticks.push(Tick::Display);
        }
        if self.autosave.fire_if_due(now) {
            ticks.push(Tick::Autosave);
        }
        if self.day_check.fire_if_due(now) {
            ticks.push(Tick::DayCheck);
        }
        ticks
    }
}

/// Detects a suspend after the fact from a jump in wall-clock time between
/// observations
#[derive(Debug, Clone)]
pub struct WakeDetector {
    threshold: chrono::Duration,
    last_seen: DateTime<Local>,
}

impl WakeDetector {
    pub fn new(threshold: Duration, now: DateTime<Local>) -> Self {
        Self {
            threshold: chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX),
            last_seen: now,
        }
    }

    /// Record an observation. Returns the last instant seen before the gap
    /// when the machine appears to have been asleep.
    pub fn observe(&mut self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let previous = std::mem::replace(&mut self.last_seen, now);
        if now - previous > self.threshold {
            Some(previous)
        } else {
            None
        }
    }
}
