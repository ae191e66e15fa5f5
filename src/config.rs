use crate::persistence::{ENTRIES_FILE, LOG_FILE, SESSION_FILE};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings (compiled-in defaults, data dir resolved at startup)
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where entries, the session file and reports live
    pub data_dir: PathBuf,
    /// Live elapsed-time refresh while a session is running
    pub display_interval: Duration,
    /// Periodic save of entries and the session file
    pub autosave_interval: Duration,
    /// Periodic day-boundary check
    pub day_check_interval: Duration,
    /// A wall-clock jump larger than this between polls is treated as a suspend
    pub sleep_gap: Duration,
    /// How long to wait for a key press per loop iteration
    pub poll_interval: Duration,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            display_interval: Duration::from_secs(1),
            autosave_interval: Duration::from_secs(60),
            day_check_interval: Duration::from_secs(60),
            sleep_gap: Duration::from_secs(90),
            poll_interval: Duration::from_millis(250),
        }
    }

    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join(ENTRIES_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
