use crate::domain::TimeEntry;
use crate::persistence::{load_json, save_json, StoreResult};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Completed entries for the tracked day, backed by a JSON file
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
    day: NaiveDate,
    entries: Vec<TimeEntry>,
}

impl EntryStore {
    /// Empty store for `day`; nothing is read until `load_from_durable`
    pub fn new(path: impl Into<PathBuf>, day: NaiveDate) -> Self {
        Self {
            path: path.into(),
            day,
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The calendar day this store is tracking
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn set_day(&mut self, day: NaiveDate) {
        self.day = day;
    }

    pub fn append(&mut self, entry: TimeEntry) {
        self.entries.push(entry);
    }

    pub fn all(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Remove every entry matching `predicate`, returning the removed ones in order
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<TimeEntry>
    where
        F: FnMut(&TimeEntry) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|entry| predicate(entry));
        self.entries = kept;
        removed
    }

    /// Replace the in-memory set with the persisted entries attributed to the
    /// tracked day. Returns how many entries were discarded, either older or
    /// ending before they start.
    ///
    /// On error the in-memory set is left untouched.
    pub fn load_from_durable(&mut self) -> StoreResult<usize> {
        let persisted: Vec<TimeEntry> = load_json(&self.path)?.unwrap_or_default();
        let total = persisted.len();

        let day = self.day;
        self.entries = persisted
            .into_iter()
            .filter(|entry| entry.day() == day)
            .filter(|entry| {
                let valid = entry.end_time >= entry.start_time;
                if !valid {
                    warn!(
                        category = %entry.category,
                        start = %entry.start_time,
                        end = %entry.end_time,
                        "dropping entry that ends before it starts"
                    );
                }
                valid
            })
            .collect();

        Ok(total - self.entries.len())
    }

    /// Overwrite the persisted log with the in-memory set
    pub fn save_to_durable(&self) -> StoreResult<()> {
        save_json(&self.path, &self.entries)
    }
}
