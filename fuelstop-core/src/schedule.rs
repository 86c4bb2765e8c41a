//! Weekly opening-hours schedules.
//!
//! Schedules are stored Monday-first. Slot numbers come from
//! [`schedule_slot`], which maps a calendar weekday counted from Sunday
//! (`0 = Sunday`) into the schedule's index: Monday becomes slot 0 and
//! Sunday becomes slot 7. Slot 6 is never populated.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};

/// Number of slots in a [`WeeklySchedule`].
pub const SCHEDULE_SLOTS: usize = 8;

/// Map a calendar weekday onto its Monday-first schedule slot.
///
/// # Examples
/// ```
/// use chrono::Weekday;
/// use fuelstop_core::schedule_slot;
///
/// assert_eq!(schedule_slot(Weekday::Mon), 0);
/// assert_eq!(schedule_slot(Weekday::Sat), 5);
/// assert_eq!(schedule_slot(Weekday::Sun), 7);
/// ```
#[must_use]
pub fn schedule_slot(weekday: Weekday) -> usize {
    match weekday.num_days_from_sunday() {
        0 => 7,
        day => day.saturating_sub(1) as usize,
    }
}

/// A single opening interval within a day.
///
/// `closes <= opens` wraps past midnight into the following day, and
/// `opens == closes` means the station is open around the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenInterval {
    /// Opening time.
    pub opens: NaiveTime,
    /// Closing time.
    pub closes: NaiveTime,
}

impl OpenInterval {
    /// Construct an interval.
    #[must_use]
    pub const fn new(opens: NaiveTime, closes: NaiveTime) -> Self {
        Self { opens, closes }
    }

    /// An interval covering the entire day.
    #[must_use]
    pub const fn all_day() -> Self {
        Self::new(NaiveTime::MIN, NaiveTime::MIN)
    }

    /// Whether the interval covers the whole day.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.opens == self.closes
    }

    /// Whether the interval continues into the next day.
    #[must_use]
    pub fn wraps_midnight(&self) -> bool {
        self.closes < self.opens
    }

    /// Whether `time` falls inside the part of the interval on its own day.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.is_all_day() {
            return true;
        }
        if self.wraps_midnight() {
            return time >= self.opens;
        }
        self.opens <= time && time < self.closes
    }

    /// Whether `time` on the following day is still inside this interval.
    #[must_use]
    pub fn spills_over_to(&self, time: NaiveTime) -> bool {
        self.wraps_midnight() && time < self.closes
    }
}

/// Opening intervals for each day of the week.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, NaiveTime, Weekday};
/// use fuelstop_core::{OpenInterval, WeeklySchedule};
///
/// let hours = OpenInterval::new(
///     NaiveTime::from_hms_opt(8, 0, 0).expect("time"),
///     NaiveTime::from_hms_opt(22, 0, 0).expect("time"),
/// );
/// let schedule = WeeklySchedule::new().with_interval(Weekday::Mon, hours);
///
/// let monday_morning = NaiveDate::from_ymd_opt(2024, 5, 6)
///     .and_then(|d| d.and_hms_opt(8, 0, 0))
///     .expect("timestamp");
/// assert!(schedule.is_open_at(monday_morning));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeeklySchedule {
    slots: [Vec<OpenInterval>; SCHEDULE_SLOTS],
}

impl WeeklySchedule {
    /// An empty schedule: closed every day.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A schedule open around the clock on every day.
    #[must_use]
    pub fn always_open() -> Self {
        ALL_WEEKDAYS
            .iter()
            .fold(Self::new(), |schedule, day| {
                schedule.with_interval(*day, OpenInterval::all_day())
            })
    }

    /// Add an interval to `weekday` and return the schedule.
    #[must_use]
    pub fn with_interval(mut self, weekday: Weekday, interval: OpenInterval) -> Self {
        self.add_interval(weekday, interval);
        self
    }

    /// Add an interval to `weekday`.
    pub fn add_interval(&mut self, weekday: Weekday, interval: OpenInterval) {
        if let Some(slot) = self.slots.get_mut(schedule_slot(weekday)) {
            slot.push(interval);
        }
    }

    /// Replace every interval on `weekday`.
    pub fn set_day(&mut self, weekday: Weekday, intervals: Vec<OpenInterval>) {
        if let Some(slot) = self.slots.get_mut(schedule_slot(weekday)) {
            *slot = intervals;
        }
    }

    /// Intervals published for `weekday`.
    #[must_use]
    pub fn hours_on(&self, weekday: Weekday) -> &[OpenInterval] {
        self.slots
            .get(schedule_slot(weekday))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether no day has any opening interval.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Whether the station is open at `at`.
    ///
    /// Checks the intervals of `at`'s weekday and any interval of the
    /// previous day that runs past midnight.
    #[must_use]
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let weekday = at.weekday();
        let time = at.time();
        let today = self
            .hours_on(weekday)
            .iter()
            .any(|interval| interval.contains(time));
        today
            || self
                .hours_on(weekday.pred())
                .iter()
                .any(|interval| interval.spills_over_to(time))
    }
}

/// Every weekday in Monday-first order.
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];
