//! Value types produced and consumed by the engine.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds on the host's monotonic time axis.
///
/// Zero is the first second of the calendar's epoch year, shifted by whatever
/// world-creation offset the host passes alongside it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into,
    Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorldTime(i64);

impl WorldTime {
    pub const ZERO: Self = Self(0);

    pub const fn new(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the raw second count
    #[inline]
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Shifts by `seconds`, saturating at the ends of the axis
    pub const fn offset_by(self, seconds: i64) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

/// Hour, minute and second within a day.
///
/// Bounds depend on the calendar's time bases, so construction is unchecked;
/// engines clamp when a time is attached to a date.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize,
    Deserialize,
)]
#[display(fmt = "{:02}:{:02}:{:02}", hour, minute, second)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self::new(0, 0, 0);

    pub const fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }
}

/// A position on one calendar.
///
/// Only engines build these, so the weekday always agrees with the rest of
/// the value. For an intercalary date `month` is the month it follows and
/// `day` counts within the intercalary period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
    weekday: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    intercalary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<TimeOfDay>,
}

impl CalendarDate {
    pub(crate) const fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        weekday: u32,
        intercalary: Option<String>,
        time: Option<TimeOfDay>,
    ) -> Self {
        Self {
            year,
            month,
            day,
            weekday,
            intercalary,
            time,
        }
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number; for intercalary dates, the month they follow.
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// 1-based day within the month or intercalary period.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Weekday index, `0..weekdays`.
    pub const fn weekday(&self) -> u32 {
        self.weekday
    }

    /// Name of the intercalary period this date falls in, if any.
    pub fn intercalary(&self) -> Option<&str> {
        self.intercalary.as_deref()
    }

    pub const fn is_intercalary(&self) -> bool {
        self.intercalary.is_some()
    }

    pub const fn time(&self) -> Option<TimeOfDay> {
        self.time
    }

    /// `(year, month, day)` as a tuple
    pub const fn ymd(&self) -> (i32, u32, u32) {
        (self.year, self.month, self.day)
    }

    /// Same date with the time-of-day dropped
    #[must_use]
    pub fn without_time(&self) -> Self {
        Self {
            time: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.intercalary {
            Some(name) => write!(f, "{:04} {name} {}", self.year, self.day)?,
            None => write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?,
        }
        if let Some(time) = self.time {
            write!(f, " {time}")?;
        }
        Ok(())
    }
}
