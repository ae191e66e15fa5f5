use super::session::SessionController;
use super::store::EntryStore;
use crate::clock::{day_of, start_of_day};
use crate::domain::{ActiveSession, TimeEntry};
use chrono::{DateTime, Local, NaiveDate};

/// What happened when the tracked day was closed out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
    /// The day that was being tracked
    pub previous_day: NaiveDate,
    /// The day now being tracked
    pub new_day: NaiveDate,
    /// Entries pruned from the store (to be reported under `previous_day`)
    pub closed: Vec<TimeEntry>,
    /// A session that spanned the boundary: its closed half and the restarted half
    pub split: Option<(TimeEntry, ActiveSession)>,
}

/// Close out the tracked day if `now` has moved past it.
///
/// Entries are attributed to the day they started on. A session running
/// across the boundary is closed at the end of the day it started on and
/// restarted at the first instant of the new day. Across a single midnight
/// the two halves meet exactly; when whole days were skipped (the clock
/// jumped) the skipped days are left untracked. Returns `None` while still on
/// the tracked day, or when the clock has gone backwards.
pub fn check_day_boundary(
    store: &mut EntryStore,
    session: &mut SessionController,
    now: DateTime<Local>,
) -> Option<Rollover> {
    let previous_day = store.day();
    let new_day = day_of(now);
    if new_day <= previous_day {
        return None;
    }

    let boundary = start_of_day(new_day);

    let split = match session.active() {
        Some(active) if active.start_time < boundary => {
            let category = active.category.clone();
            let end_of_start_day = day_of(active.start_time)
                .succ_opt()
                .map_or(boundary, start_of_day)
                .min(boundary);
            session.stop(end_of_start_day).and_then(|closed| {
                store.append(closed.clone());
                session
                    .start(&category, boundary)
                    .map(|restarted| (closed, restarted))
            })
        }
        _ => None,
    };

    let closed = store.remove_where(|entry| entry.day() < new_day);
    store.set_day(new_day);

    Some(Rollover {
        previous_day,
        new_day,
        closed,
        split,
    })
}
