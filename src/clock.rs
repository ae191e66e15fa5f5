use chrono::{DateTime, Local, NaiveDate, SubsecRound, TimeZone};

/// Source of the current instant
pub trait Clock {
    /// Current instant, truncated to whole seconds
    fn now(&self) -> DateTime<Local>;

    /// Current calendar day
    fn today(&self) -> NaiveDate {
        day_of(self.now())
    }
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now().trunc_subsecs(0)
    }
}

/// Calendar day an instant falls on
pub fn day_of(instant: DateTime<Local>) -> NaiveDate {
    instant.date_naive()
}

/// First instant of a calendar day
pub fn start_of_day(day: NaiveDate) -> DateTime<Local> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&midnight).earliest() {
        Some(instant) => instant,
        // Midnight skipped by a DST jump
        None => Local.from_utc_datetime(&midnight),
    }
}

/// Build a local instant (test helper)
#[cfg(test)]
pub fn local(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .earliest()
        .expect("valid local time")
}

/// Clock whose time only moves when told to; clones share the same time
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Local>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}
