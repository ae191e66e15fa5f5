use crate::clock::day_of;
use crate::domain::ActiveSession;
use crate::persistence::{load_json, remove_file, save_json, StoreResult};
use chrono::NaiveDate;
use std::path::PathBuf;

/// What startup recovery found in the session file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovered {
    /// No session file
    Nothing,
    /// A session started today; resume it
    Restored(ActiveSession),
    /// A session from an earlier day; the file was removed and the time dropped
    Discarded(ActiveSession),
}

/// Mirrors the in-progress session to its own file so it survives a crash
#[derive(Debug, Clone)]
pub struct CrashRecovery {
    path: PathBuf,
}

impl CrashRecovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the session, or delete the file when there is none
    pub fn save(&self, session: Option<&ActiveSession>) -> StoreResult<()> {
        match session {
            Some(session) => save_json(&self.path, session),
            None => remove_file(&self.path).map(|_| ()),
        }
    }

    /// Read the persisted session without acting on it
    pub fn load(&self) -> StoreResult<Option<ActiveSession>> {
        load_json(&self.path)
    }

    /// Startup recovery: keep a session only if it started on `today`,
    /// otherwise delete the file.
    ///
    /// A stale session is not turned into an entry; its time is lost.
    pub fn recover(&self, today: NaiveDate) -> StoreResult<Recovered> {
        let Some(session) = self.load()? else {
            return Ok(Recovered::Nothing);
        };

        if day_of(session.start_time) == today {
            return Ok(Recovered::Restored(session));
        }

        remove_file(&self.path)?;
        Ok(Recovered::Discarded(session))
    }
}
