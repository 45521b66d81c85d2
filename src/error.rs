//! Error types for the world_calendar crate.
//!
//! Three families, matching the three places a calendar can go wrong:
//! call arguments ([`CalendarError`]), definition shape ([`DefinitionError`])
//! and variant overlays ([`VariantError`]). None of them ends an operation on
//! its own; see [`Clamped`] for how argument problems travel next to a
//! best-effort value.

/// Error type for call-argument and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// A month number outside `1..=months`.
    #[error("invalid month: {month} (must be 1..={months})")]
    MonthOutOfRange {
        /// The month that was provided.
        month: u32,
        /// Number of months in the calendar.
        months: u32,
    },

    /// A day number outside `1..=max_day` for the given month and year.
    #[error("invalid day {day} for month {month} of year {year} (max {max_day})")]
    DayOutOfRange {
        /// The day that was provided.
        day: u32,
        /// The month the day was checked against.
        month: u32,
        /// The year the day was checked against.
        year: i32,
        /// Last valid day of that month in that year.
        max_day: u32,
    },

    /// An intercalary day name the calendar does not define.
    #[error("unknown intercalary day: {name}")]
    UnknownIntercalary {
        /// The requested name.
        name: String,
    },

    /// An intercalary day that exists but does not occur in the given year.
    #[error("intercalary day {name} does not occur in year {year}")]
    IntercalaryNotInYear {
        /// The intercalary day name.
        name: String,
        /// The year it was requested for.
        year: i32,
    },

    /// A weekday index outside `0..weekdays`.
    #[error("invalid weekday: {weekday} (must be 0..{weekdays})")]
    WeekdayOutOfRange {
        /// The weekday index that was provided.
        weekday: u32,
        /// Number of weekdays in the calendar.
        weekdays: u32,
    },

    /// A time-of-day component beyond the calendar's time bases.
    #[error("invalid time {hour}:{minute}:{second}")]
    TimeOutOfRange {
        /// Hour component.
        hour: u32,
        /// Minute component.
        minute: u32,
        /// Second component.
        second: u32,
    },

    /// A calendar id not present in the registry.
    #[error("unknown calendar: {id}")]
    UnknownCalendar {
        /// The requested calendar id.
        id: String,
    },

    /// No calendar has been selected as active.
    #[error("no active calendar")]
    NoActiveCalendar,
}

/// Error type for calendar definitions that break structural rules.
///
/// Raised by [`CalendarDefinition::validate`](crate::CalendarDefinition::validate)
/// at load time. The engine itself trusts definitions that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The calendar defines no months.
    #[error("calendar {id} has no months")]
    EmptyMonths {
        /// Calendar id.
        id: String,
    },

    /// The calendar defines no weekdays.
    #[error("calendar {id} has no weekdays")]
    EmptyWeekdays {
        /// Calendar id.
        id: String,
    },

    /// `year.startDay` is not a weekday index.
    #[error("start day {start_day} is outside 0..{weekdays}")]
    StartDayOutOfRange {
        /// The configured start day.
        start_day: u32,
        /// Number of weekdays.
        weekdays: u32,
    },

    /// An intercalary day references a month that does not exist.
    #[error("intercalary day {name} follows unknown month {reference}")]
    InvalidAfterMonth {
        /// Intercalary day name.
        name: String,
        /// The unresolved month reference.
        reference: String,
    },

    /// An intercalary day spans zero days.
    #[error("intercalary day {name} must span at least one day")]
    EmptyIntercalary {
        /// Intercalary day name.
        name: String,
    },

    /// A custom leap rule with an interval below one.
    #[error("leap year interval must be >= 1, got {interval}")]
    InvalidLeapInterval {
        /// The configured interval.
        interval: i32,
    },

    /// A custom leap rule targets a month that does not exist.
    #[error("leap year month {reference} does not exist")]
    InvalidLeapMonth {
        /// The unresolved month reference.
        reference: String,
    },

    /// A time base of zero.
    #[error("time unit {unit} must be >= 1")]
    ZeroTimeUnit {
        /// Which unit: `hoursInDay`, `minutesInHour` or `secondsInMinute`.
        unit: &'static str,
    },

    /// A variant id that would make derived ids ambiguous.
    #[error("variant id {variant} must not be empty or contain '(' or ')'")]
    InvalidVariantId {
        /// The offending variant id.
        variant: String,
    },

    /// The definition text is not valid calendar JSON.
    #[error("invalid calendar json: {0}")]
    Json(String),
}

/// Error type for variant overlays that cannot be applied.
///
/// Variant failures are reported and skipped; they never touch the base
/// definition or other variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    /// The overlay names a base calendar that is not registered.
    #[error("variant {variant} targets unknown base calendar {base}")]
    UnknownBase {
        /// The requested base calendar id.
        base: String,
        /// The variant id.
        variant: String,
    },

    /// The overrides object has the wrong shape.
    #[error("malformed overrides for variant {variant}: {reason}")]
    MalformedOverrides {
        /// The variant id.
        variant: String,
        /// What the parser rejected.
        reason: String,
    },

    /// The variant id is empty or contains the id delimiters.
    #[error("invalid variant id {variant:?}")]
    InvalidId {
        /// The variant id.
        variant: String,
    },

    /// The merged calendar breaks a structural rule.
    #[error("variant {variant} does not validate after merging")]
    InvalidDefinition {
        /// The variant id.
        variant: String,
        /// Every problem found by
        /// [`CalendarDefinition::validate`](crate::CalendarDefinition::validate).
        errors: Vec<DefinitionError>,
    },

    /// The base declares no variant with this id.
    #[error("calendar {base} has no variant {variant}")]
    UnknownVariant {
        /// The base calendar id.
        base: String,
        /// The requested variant id.
        variant: String,
    },
}

/// A best-effort value computed from clamped arguments.
///
/// Operations that take raw month/day numbers clamp them into range instead of
/// failing. The value is always usable; `issue` says whether anything was
/// clamped on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Clamped<T> {
    value: T,
    issue: Option<CalendarError>,
}

impl<T> Clamped<T> {
    /// A value computed from arguments that were already in range.
    pub const fn exact(value: T) -> Self {
        Self { value, issue: None }
    }

    /// A value computed after clamping, with the reason attached.
    pub const fn adjusted(value: T, issue: CalendarError) -> Self {
        Self {
            value,
            issue: Some(issue),
        }
    }

    pub(crate) fn with_issue(value: T, issue: Option<CalendarError>) -> Self {
        Self { value, issue }
    }

    /// Borrows the value.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the value, discarding any issue.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Returns the clamping issue, if any.
    pub const fn issue(&self) -> Option<&CalendarError> {
        self.issue.as_ref()
    }

    /// `true` when nothing had to be clamped.
    pub const fn is_exact(&self) -> bool {
        self.issue.is_none()
    }

    /// Treats any clamping as an error.
    ///
    /// # Errors
    /// Returns the recorded [`CalendarError`] when an argument was clamped.
    pub fn into_result(self) -> Result<T, CalendarError> {
        match self.issue {
            Some(issue) => Err(issue),
            None => Ok(self.value),
        }
    }

    /// Maps the value, keeping the issue.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Clamped<U> {
        Clamped {
            value: f(self.value),
            issue: self.issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_month_out_of_range() {
        let err = CalendarError::MonthOutOfRange {
            month: 13,
            months: 12,
        };
        assert_eq!(err.to_string(), "invalid month: 13 (must be 1..=12)");
    }

    #[test]
    fn error_day_out_of_range() {
        let err = CalendarError::DayOutOfRange {
            day: 30,
            month: 2,
            year: 2023,
            max_day: 28,
        };
        assert_eq!(
            err.to_string(),
            "invalid day 30 for month 2 of year 2023 (max 28)"
        );
    }

    #[test]
    fn error_intercalary_not_in_year() {
        let err = CalendarError::IntercalaryNotInYear {
            name: "Shieldmeet".to_owned(),
            year: 1491,
        };
        assert_eq!(
            err.to_string(),
            "intercalary day Shieldmeet does not occur in year 1491"
        );
    }

    #[test]
    fn error_definition_messages() {
        let err = DefinitionError::InvalidAfterMonth {
            name: "Midwinter".to_owned(),
            reference: "Frostmoon".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "intercalary day Midwinter follows unknown month Frostmoon"
        );

        let err = DefinitionError::ZeroTimeUnit {
            unit: "hoursInDay",
        };
        assert_eq!(err.to_string(), "time unit hoursInDay must be >= 1");
    }

    #[test]
    fn error_variant_messages() {
        let err = VariantError::UnknownBase {
            base: "golarion".to_owned(),
            variant: "eberron".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "variant eberron targets unknown base calendar golarion"
        );

        let err = VariantError::InvalidDefinition {
            variant: "hollow".to_owned(),
            errors: vec![DefinitionError::InvalidLeapInterval { interval: 0 }],
        };
        assert_eq!(
            err.to_string(),
            "variant hollow does not validate after merging"
        );
    }

    #[test]
    fn clamped_exact_into_result() {
        let c = Clamped::exact(5_u32);
        assert!(c.is_exact());
        assert_eq!(c.into_result(), Ok(5));
    }

    #[test]
    fn clamped_adjusted_keeps_value_and_issue() {
        let issue = CalendarError::MonthOutOfRange {
            month: 0,
            months: 12,
        };
        let c = Clamped::adjusted(1_u32, issue.clone());
        assert!(!c.is_exact());
        assert_eq!(*c.value(), 1);
        assert_eq!(c.issue(), Some(&issue));
        assert_eq!(c.clone().map(|v| v + 1).into_value(), 2);
        assert_eq!(c.into_result(), Err(issue));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<CalendarError>();
        assert_impl::<DefinitionError>();
        assert_impl::<VariantError>();
    }
}
