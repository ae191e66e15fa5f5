pub mod recovery;
pub mod rollover;
pub mod session;
pub mod store;

pub use recovery::{CrashRecovery, Recovered};
pub use rollover::{check_day_boundary, Rollover};
pub use session::{SessionController, Transition};
pub use store::EntryStore;

use crate::clock::Clock;
use crate::config::Settings;
use crate::domain::{ActiveSession, Category, SessionState, TimeEntry};
use crate::persistence::{backup_file, StoreError};
use crate::report::{ExportOptions, ExportOutput, Exporter, Summary};
use chrono::{DateTime, Duration, Local, NaiveDate};
use tracing::{debug, info, warn};

/// Most recent diagnostics kept in memory
const MAX_DIAGNOSTICS: usize = 50;

/// Outbound calls to whatever displays the tracker
pub trait Presenter {
    /// The session state changed; redraw the menu
    fn refresh_menu(&mut self, state: &SessionState);

    /// Periodic live update while a session is running
    fn update_elapsed(&mut self, session: &ActiveSession, elapsed: Duration);
}

/// Presenter that displays nothing
impl Presenter for () {
    fn refresh_menu(&mut self, _state: &SessionState) {}
    fn update_elapsed(&mut self, _session: &ActiveSession, _elapsed: Duration) {}
}

/// A persistence failure that was logged and swallowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub operation: &'static str,
    pub message: String,
}

/// Coordinates the session state machine, the entry store, crash recovery,
/// day rollover and export. Every inbound event goes through here; no I/O
/// failure ever escapes to the caller.
pub struct Tracker<C: Clock, P: Presenter> {
    clock: C,
    presenter: P,
    categories: &'static [Category],
    session: SessionController,
    store: EntryStore,
    recovery: CrashRecovery,
    exporter: Exporter,
    diagnostics: Vec<Diagnostic>,
    /// Total failures recorded, including ones evicted from `diagnostics`
    failures: u64,
}

impl<C: Clock, P: Presenter> Tracker<C, P> {
    /// Load today's entries and recover an in-progress session
    pub fn open(settings: &Settings, categories: &'static [Category], clock: C, presenter: P) -> Self {
        let today = clock.today();
        let mut tracker = Self {
            store: EntryStore::new(settings.entries_path(), today),
            recovery: CrashRecovery::new(settings.session_path()),
            exporter: Exporter::new(settings.data_dir(), categories),
            session: SessionController::new(categories),
            categories,
            clock,
            presenter,
            diagnostics: Vec::new(),
            failures: 0,
        };

        tracker.load_entries();
        tracker.recover_session(today);
        tracker.presenter.refresh_menu(tracker.session.state());
        tracker
    }

    fn load_entries(&mut self) {
        match self.store.load_from_durable() {
            Ok(discarded) => {
                info!(
                    day = %self.store.day(),
                    loaded = self.store.len(),
                    discarded,
                    "loaded entries"
                );
            }
            Err(err) => {
                if err.is_corrupt() {
                    match backup_file(self.store.path(), self.clock.now()) {
                        Ok(backup) => warn!(backup = %backup.display(), "backed up unreadable entries file"),
                        Err(backup_err) => self.record("backup entries", backup_err),
                    }
                }
                self.record("load entries", err);
            }
        }
    }

    fn recover_session(&mut self, today: NaiveDate) {
        match self.recovery.recover(today) {
            Ok(Recovered::Restored(session)) => {
                if crate::domain::category::find(self.categories, &session.category).is_some() {
                    info!(category = %session.category, start = %session.start_time, "resumed session");
                    self.session.restore(session);
                } else {
                    warn!(category = %session.category, "recovered session has unknown category, dropping");
                    self.persist_session();
                }
            }
            Ok(Recovered::Discarded(session)) => {
                // Not converted into an entry: the stop time is unknown
                warn!(
                    category = %session.category,
                    start = %session.start_time,
                    "discarded session left running on an earlier day"
                );
            }
            Ok(Recovered::Nothing) => {}
            Err(err) => self.record("recover session", err),
        }
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn entries(&self) -> &[TimeEntry] {
        self.store.all()
    }

    pub fn tracked_day(&self) -> NaiveDate {
        self.store.day()
    }

    pub fn categories(&self) -> &'static [Category] {
        self.categories
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Monotonic count of recorded failures
    pub fn failure_count(&self) -> u64 {
        self.failures
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Start `name` unless something is already running
    pub fn start(&mut self, name: &str) -> bool {
        let now = self.clock.now();
        match self.session.start(name, now) {
            Some(session) => {
                info!(category = %session.category, "started");
                self.after_transition(false);
                true
            }
            None => {
                debug!(category = name, "start ignored");
                false
            }
        }
    }

    /// Stop the running session at the current instant
    pub fn stop(&mut self) -> Option<TimeEntry> {
        let now = self.clock.now();
        self.stop_at(now)
    }

    fn stop_at(&mut self, end: DateTime<Local>) -> Option<TimeEntry> {
        let entry = self.session.stop(end)?;
        log_stopped(&entry);
        self.store.append(entry.clone());
        self.after_transition(true);
        Some(entry)
    }

    /// Menu action: stop whatever runs, start `name` unless it was just stopped
    pub fn toggle(&mut self, name: &str) -> Transition {
        let now = self.clock.now();
        let transition = self.session.toggle(name, now);

        if let Some(entry) = transition.stopped() {
            log_stopped(entry);
            self.store.append(entry.clone());
        }
        if let Some(session) = transition.started() {
            info!(category = %session.category, "started");
        }

        match &transition {
            Transition::Ignored => debug!(category = name, "toggle ignored: unknown category"),
            _ => self.after_transition(transition.stopped().is_some()),
        }
        transition
    }

    fn after_transition(&mut self, entries_changed: bool) {
        if entries_changed {
            self.persist_entries();
        }
        self.persist_session();
        self.presenter.refresh_menu(self.session.state());
    }

    /// The machine is about to sleep: stop now
    pub fn system_sleeping(&mut self) -> Option<TimeEntry> {
        let now = self.clock.now();
        self.system_sleeping_at(now)
    }

    /// The machine slept starting at `suspended_at`: stop as of that instant
    pub fn system_sleeping_at(&mut self, suspended_at: DateTime<Local>) -> Option<TimeEntry> {
        let entry = self.stop_at(suspended_at)?;
        info!(suspended_at = %suspended_at, "stopped for system sleep");
        Some(entry)
    }

    /// Shutdown: close the session, save, and write today's report
    pub fn application_terminating(&mut self) {
        // stop() already persists both files
        if self.stop().is_none() {
            self.persist_entries();
            self.persist_session();
        }

        let day = self.store.day();
        let options = ExportOptions {
            as_json: false,
            write_to_disk: true,
        };
        if let Err(err) = self.exporter.export(self.store.all(), day, options) {
            self.record("export on terminate", err);
        }
        info!("terminated cleanly");
    }

    /// Menu action: write today's report and JSON, including the live session
    pub fn export_requested(&mut self) -> Option<ExportOutput> {
        let entries = self.snapshot_entries();
        let options = ExportOptions {
            as_json: true,
            write_to_disk: true,
        };
        match self.exporter.export(&entries, self.store.day(), options) {
            Ok(output) => {
                if let Some(path) = &output.report_path {
                    info!(path = %path.display(), "exported report");
                }
                Some(output)
            }
            Err(err) => {
                self.record("export", err);
                None
            }
        }
    }

    /// Periodic save so a crash loses as little as possible
    pub fn autosave_tick(&mut self) {
        self.persist_entries();
        self.persist_session();
    }

    /// Periodic live-label refresh
    pub fn display_tick(&mut self) {
        let now = self.clock.now();
        if let Some(session) = self.session.active() {
            self.presenter.update_elapsed(session, session.elapsed(now));
        }
    }

    /// Periodic day-boundary check; rolls over, reports and persists when
    /// the day has changed
    pub fn check_day_boundary(&mut self) -> Option<Rollover> {
        let now = self.clock.now();
        let rollover = check_day_boundary(&mut self.store, &mut self.session, now)?;

        info!(
            previous_day = %rollover.previous_day,
            new_day = %rollover.new_day,
            closed = rollover.closed.len(),
            split = rollover.split.is_some(),
            "day rolled over"
        );

        let options = ExportOptions {
            as_json: false,
            write_to_disk: true,
        };
        if let Err(err) = self
            .exporter
            .export(&rollover.closed, rollover.previous_day, options)
        {
            self.record("export on rollover", err);
        }

        self.persist_entries();
        self.persist_session();
        if rollover.split.is_some() {
            self.presenter.refresh_menu(self.session.state());
        }
        Some(rollover)
    }

    /// Completed entries plus the live session as an entry ending now
    pub fn snapshot_entries(&self) -> Vec<TimeEntry> {
        live_entries(self.store.all(), self.session.active(), self.clock.now())
    }

    /// Today's totals including the live session
    pub fn summary(&self) -> Summary {
        Summary::from_entries(&self.snapshot_entries(), self.categories)
    }

    fn persist_entries(&mut self) {
        if let Err(err) = self.store.save_to_durable() {
            self.record("save entries", err);
        }
    }

    fn persist_session(&mut self) {
        if let Err(err) = self.recovery.save(self.session.active()) {
            self.record("save session", err);
        }
    }

    fn record(&mut self, operation: &'static str, err: StoreError) {
        warn!(operation, error = %err, "persistence failure");
        self.failures += 1;
        if self.diagnostics.len() >= MAX_DIAGNOSTICS {
            self.diagnostics.remove(0);
        }
        self.diagnostics.push(Diagnostic {
            operation,
            message: err.to_string(),
        });
    }
}

fn log_stopped(entry: &TimeEntry) {
    info!(
        category = %entry.category,
        seconds = entry.duration().num_seconds(),
        "stopped"
    );
}

/// Append the running session, closed at `now`, to a copy of `entries`
pub fn live_entries(entries: &[TimeEntry], active: Option<&ActiveSession>, now: DateTime<Local>) -> Vec<TimeEntry> {
    let mut all = entries.to_vec();
    if let Some(session) = active {
        all.push(session.close(now));
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{local, ManualClock};
    use crate::domain::category;
    use crate::persistence::{atomic_write, read_file, save_json};
    use tempfile::{tempdir, TempDir};

    #[derive(Debug, Default)]
    struct RecordingPresenter {
        refreshes: Vec<Option<String>>,
        elapsed: Vec<(String, i64)>,
    }

    impl Presenter for RecordingPresenter {
        fn refresh_menu(&mut self, state: &SessionState) {
            self.refreshes.push(state.category().map(str::to_string));
        }

        fn update_elapsed(&mut self, session: &ActiveSession, elapsed: Duration) {
            self.elapsed.push((session.category.clone(), elapsed.num_seconds()));
        }
    }

    type TestTracker = Tracker<ManualClock, RecordingPresenter>;

    fn open_at(dir: &TempDir, now: DateTime<Local>) -> (TestTracker, ManualClock) {
        let clock = ManualClock::new(now);
        let settings = Settings::new(dir.path());
        let tracker = Tracker::open(&settings, category::all(), clock.clone(), RecordingPresenter::default());
        (tracker, clock)
    }

    #[test]
    fn test_toggle_twice_records_entry() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));

        tracker.toggle("Work");
        assert!(dir.path().join("current-session.json").exists());

        clock.advance(Duration::minutes(30));
        tracker.toggle("Work");

        assert!(!tracker.state().is_active());
        assert_eq!(
            tracker.entries(),
            &[TimeEntry::new("Work", local(2024, 3, 15, 9, 0, 0), local(2024, 3, 15, 9, 30, 0))]
        );
        assert!(!dir.path().join("current-session.json").exists());
        assert!(read_file(dir.path().join("time-entries.json")).unwrap().is_some());
        assert!(tracker.diagnostics().is_empty());
    }

    #[test]
    fn test_toggle_other_category_switches() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));

        tracker.toggle("Work");
        clock.advance(Duration::minutes(10));
        tracker.toggle("Email");

        assert_eq!(tracker.entries().len(), 1);
        assert_eq!(tracker.entries()[0].category, "Work");
        assert_eq!(tracker.state().category(), Some("Email"));
    }

    #[test]
    fn test_every_transition_refreshes_menu() {
        let dir = tempdir().unwrap();
        let (mut tracker, _clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));

        tracker.toggle("Work");
        tracker.toggle("Break");
        tracker.stop();
        // Ignored: nothing refreshes
        tracker.stop();
        tracker.toggle("Gardening");

        assert_eq!(
            tracker.presenter().refreshes,
            vec![None, Some("Work".to_string()), Some("Break".to_string()), None]
        );
    }

    #[test]
    fn test_start_while_active_is_noop() {
        let dir = tempdir().unwrap();
        let (mut tracker, _clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));

        assert!(tracker.start("Work"));
        assert!(!tracker.start("Email"));
        assert_eq!(tracker.state().category(), Some("Work"));
    }

    #[test]
    fn test_restart_restores_entries_and_session() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));
        tracker.toggle("Work");
        clock.advance(Duration::minutes(45));
        tracker.toggle("Learning");
        clock.advance(Duration::minutes(5));
        tracker.autosave_tick();
        let entries = tracker.entries().to_vec();
        let state = tracker.state().clone();
        // Simulate a crash: drop without terminating
        drop(tracker);

        let (reopened, _clock) = open_at(&dir, local(2024, 3, 15, 10, 0, 0));

        assert_eq!(reopened.entries(), entries.as_slice());
        assert_eq!(reopened.state(), &state);
    }

    #[test]
    fn test_stale_session_is_discarded_on_open() {
        let dir = tempdir().unwrap();
        let stale = ActiveSession::new("Work", local(2024, 3, 14, 18, 0, 0));
        save_json(dir.path().join("current-session.json"), &stale).unwrap();

        let (tracker, _clock) = open_at(&dir, local(2024, 3, 15, 8, 0, 0));

        assert!(!tracker.state().is_active());
        assert!(tracker.entries().is_empty());
        assert!(!dir.path().join("current-session.json").exists());
    }

    #[test]
    fn test_corrupt_entries_file_is_backed_up() {
        let dir = tempdir().unwrap();
        let entries_path = dir.path().join("time-entries.json");
        atomic_write(&entries_path, "{{{").unwrap();

        let (tracker, _clock) = open_at(&dir, local(2024, 3, 15, 8, 0, 0));

        assert!(tracker.entries().is_empty());
        assert_eq!(tracker.diagnostics().len(), 1);
        assert_eq!(tracker.diagnostics()[0].operation, "load entries");
        let backup = dir.path().join("time-entries.bak.20240315_080000.json");
        assert_eq!(read_file(&backup).unwrap().as_deref(), Some("{{{"));
    }

    #[test]
    fn test_write_failures_are_recorded_not_raised() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new(local(2024, 3, 15, 9, 0, 0));
        let settings = Settings::new(dir.path().join("missing"));
        let mut tracker = Tracker::open(&settings, category::all(), clock.clone(), ());

        tracker.toggle("Work");
        clock.advance(Duration::minutes(1));
        tracker.toggle("Work");

        // In-memory state keeps working
        assert_eq!(tracker.entries().len(), 1);
        assert!(!tracker.state().is_active());
        let operations: Vec<_> = tracker.diagnostics().iter().map(|d| d.operation).collect();
        assert!(operations.contains(&"save session"));
        assert!(operations.contains(&"save entries"));
    }

    #[test]
    fn test_terminating_with_session_writes_each_file_once() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new(local(2024, 3, 15, 9, 0, 0));
        let settings = Settings::new(dir.path().join("missing"));
        let mut tracker = Tracker::open(&settings, category::all(), clock.clone(), ());

        tracker.start("Work");
        let before = tracker.failure_count();
        clock.advance(Duration::minutes(5));
        tracker.application_terminating();

        let operations: Vec<_> = tracker.diagnostics()[before as usize..]
            .iter()
            .map(|d| d.operation)
            .collect();
        // The session file is removed, which succeeds even without the dir
        assert_eq!(operations, vec!["save entries", "export on terminate"]);
        assert_eq!(tracker.failure_count(), before + 2);
    }

    #[test]
    fn test_failure_count_survives_diagnostic_eviction() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new(local(2024, 3, 15, 9, 0, 0));
        let settings = Settings::new(dir.path().join("missing"));
        let mut tracker = Tracker::open(&settings, category::all(), clock, ());

        for _ in 0..60 {
            tracker.autosave_tick();
        }

        assert_eq!(tracker.diagnostics().len(), MAX_DIAGNOSTICS);
        assert_eq!(tracker.failure_count(), 60);
    }

    #[test]
    fn test_day_boundary_splits_running_session() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 23, 0, 0));
        tracker.toggle("Break");
        clock.advance(Duration::minutes(10));
        tracker.toggle("Work");

        clock.set(local(2024, 3, 16, 0, 0, 40));
        let rollover = tracker.check_day_boundary().unwrap();

        let midnight = local(2024, 3, 16, 0, 0, 0);
        let (closed, restarted) = rollover.split.unwrap();
        assert_eq!(closed.end_time, midnight);
        assert_eq!(restarted.start_time, midnight);
        assert_eq!(tracker.state().active(), Some(&restarted));

        // Yesterday is gone from the store and written to its report
        assert!(tracker.entries().is_empty());
        assert_eq!(tracker.tracked_day(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        let report = read_file(dir.path().join("time-tracking-2024-03-15.txt"))
            .unwrap()
            .unwrap();
        assert!(report.contains("Work   00:50:00"));
        assert!(report.contains("Total active time: 00:50:00"));
        assert!(!dir.path().join("time-tracking-export.json").exists());

        // Persisted state matches memory
        let (reopened, _clock) = open_at(&dir, local(2024, 3, 16, 0, 2, 0));
        assert!(reopened.entries().is_empty());
        assert_eq!(reopened.state().active(), Some(&restarted));
    }

    #[test]
    fn test_day_check_on_same_day_is_noop() {
        let dir = tempdir().unwrap();
        let (mut tracker, _clock) = open_at(&dir, local(2024, 3, 15, 12, 0, 0));
        assert!(tracker.check_day_boundary().is_none());
    }

    #[test]
    fn test_sleep_stops_at_suspend_instant() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));
        tracker.toggle("Work");

        let suspended = local(2024, 3, 15, 9, 20, 0);
        clock.set(local(2024, 3, 15, 11, 0, 0));
        let entry = tracker.system_sleeping_at(suspended).unwrap();

        assert_eq!(entry.end_time, suspended);
        assert!(!tracker.state().is_active());
        assert!(tracker.system_sleeping().is_none());
    }

    #[test]
    fn test_export_includes_live_session() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));
        tracker.toggle("Work");
        clock.advance(Duration::hours(1));
        tracker.toggle("Break");
        clock.advance(Duration::minutes(30));

        let output = tracker.export_requested().unwrap();

        assert!(output.report.contains("Break  00:30:00"));
        assert!(output.report.contains("Total active time: 01:00:00"));
        let json: Vec<TimeEntry> = serde_json::from_str(output.json.as_deref().unwrap()).unwrap();
        assert_eq!(json.len(), 2);
        // The live session was not committed
        assert_eq!(tracker.entries().len(), 1);
        assert_eq!(tracker.state().category(), Some("Break"));
    }

    #[test]
    fn test_terminating_closes_session_and_reports() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));
        tracker.toggle("Meetings");
        clock.advance(Duration::minutes(15));

        tracker.application_terminating();

        assert!(!tracker.state().is_active());
        assert!(!dir.path().join("current-session.json").exists());
        let report = read_file(dir.path().join("time-tracking-2024-03-15.txt"))
            .unwrap()
            .unwrap();
        assert!(report.contains("Meetings  00:15:00"));

        let (reopened, _clock) = open_at(&dir, local(2024, 3, 15, 9, 30, 0));
        assert_eq!(reopened.entries().len(), 1);
        assert!(!reopened.state().is_active());
    }

    #[test]
    fn test_display_tick_reports_elapsed_only_when_active() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));

        tracker.display_tick();
        tracker.toggle("Learning");
        clock.advance(Duration::seconds(5));
        tracker.display_tick();

        assert_eq!(tracker.presenter().elapsed, vec![("Learning".to_string(), 5)]);
    }

    #[test]
    fn test_summary_counts_live_session() {
        let dir = tempdir().unwrap();
        let (mut tracker, clock) = open_at(&dir, local(2024, 3, 15, 9, 0, 0));
        tracker.toggle("Work");
        clock.advance(Duration::minutes(20));

        assert_eq!(tracker.summary().seconds_for("Work"), 1200);
    }
}
