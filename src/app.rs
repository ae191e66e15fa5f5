use crate::clock::Clock;
use crate::domain::{ActiveSession, SessionState};
use crate::report::format_hms;
use crate::tracker::{Presenter, Tracker, Transition};
use chrono::Duration;

/// Presenter state read by the terminal renderer
#[derive(Debug, Default)]
pub struct MenuPresenter {
    /// Set when the menu must be redrawn after a transition
    pub needs_redraw: bool,
    /// "Work 00:12:03" while a session is running
    pub elapsed_label: Option<String>,
}

impl Presenter for MenuPresenter {
    fn refresh_menu(&mut self, state: &SessionState) {
        self.needs_redraw = true;
        self.elapsed_label = state
            .active()
            .map(|session| format!("{} {}", session.category, format_hms(0)));
    }

    fn update_elapsed(&mut self, session: &ActiveSession, elapsed: Duration) {
        self.needs_redraw = true;
        self.elapsed_label = Some(format!(
            "{} {}",
            session.category,
            format_hms(elapsed.num_seconds())
        ));
    }
}

/// Terminal menu state
pub struct AppState<C: Clock> {
    pub tracker: Tracker<C, MenuPresenter>,
    pub selected_index: usize,
    /// Last user-facing message (export path, sleep stop, rollover)
    status: Option<String>,
    /// Tracker failure count when `status` was set
    status_mark: u64,
}

impl<C: Clock> AppState<C> {
    pub fn new(tracker: Tracker<C, MenuPresenter>) -> Self {
        let mut app = Self {
            tracker,
            selected_index: 0,
            status: None,
            status_mark: 0,
        };
        // Start with the cursor on the running category
        if let Some(name) = app.tracker.state().category() {
            if let Some(idx) = app.tracker.categories().iter().position(|c| c.name == name) {
                app.selected_index = idx;
            }
        }
        app
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.tracker.categories().len() {
            self.selected_index += 1;
        }
    }

    /// Toggle the highlighted category
    pub fn toggle_selected(&mut self) {
        self.toggle_index(self.selected_index);
    }

    /// Toggle the category at `index` (0-based menu position)
    pub fn toggle_index(&mut self, index: usize) {
        let Some(category) = self.tracker.categories().get(index) else {
            return;
        };
        self.selected_index = index;

        self.run(|tracker| match tracker.toggle(category.name) {
            Transition::Started(session) => Some(format!("Tracking {}", session.category)),
            Transition::Stopped(entry) => Some(format!(
                "Stopped {} after {}",
                entry.category,
                format_hms(entry.duration().num_seconds())
            )),
            Transition::Switched { stopped, started } => {
                Some(format!("Switched from {} to {}", stopped.category, started.category))
            }
            Transition::Ignored => None,
        });
    }

    pub fn stop(&mut self) {
        self.run(|tracker| {
            tracker.stop().map(|entry| {
                format!(
                    "Stopped {} after {}",
                    entry.category,
                    format_hms(entry.duration().num_seconds())
                )
            })
        });
    }

    pub fn export(&mut self) {
        self.run(|tracker| match tracker.export_requested() {
            Some(output) => output
                .report_path
                .map(|path| format!("Exported {}", path.display())),
            None => Some("Export failed, see log".to_string()),
        });
    }

    /// Run a tracker action and show the message it returns. A failure
    /// recorded during the action still takes over the status line.
    pub fn run<F>(&mut self, action: F)
    where
        F: FnOnce(&mut Tracker<C, MenuPresenter>) -> Option<String>,
    {
        let mark = self.tracker.failure_count();
        if let Some(message) = action(&mut self.tracker) {
            self.status = Some(message);
            self.status_mark = mark;
        }
    }

    /// Whether a failure was recorded after the current status was set
    pub fn is_failing(&self) -> bool {
        self.tracker.failure_count() > self.status_mark
    }

    /// Message for the status line: the newest of the status and the latest
    /// diagnostic
    pub fn status_line(&self) -> Option<String> {
        if self.is_failing() {
            if let Some(diagnostic) = self.tracker.diagnostics().last() {
                return Some(format!("{} failed: {}", diagnostic.operation, diagnostic.message));
            }
        }
        self.status.clone()
    }
}
