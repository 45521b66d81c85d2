use crate::consts::{
    DEFAULT_HOURS_IN_DAY, DEFAULT_INTERCALARY_DAYS, DEFAULT_MINUTES_IN_HOUR,
    DEFAULT_SECONDS_IN_MINUTE, VARIANT_CLOSE, VARIANT_OPEN,
};
use crate::error::DefinitionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The immutable rules of one calendar.
///
/// Built once by the loader (or once per variant by the resolver) and shared
/// read-only by every engine that operates on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub year: YearConfig,
    #[serde(default)]
    pub leap_year: LeapYearRule,
    pub months: Vec<CalendarMonth>,
    pub weekdays: Vec<CalendarWeekday>,
    #[serde(default, alias = "intercalary")]
    pub intercalary_days: Vec<IntercalaryDay>,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub moons: Vec<Moon>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub date_formats: DateFormats,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, CalendarVariant>,
}

/// Year numbering: where counting starts and how years are labelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YearConfig {
    /// Year number at world time zero.
    pub epoch: i32,
    /// Year the host shows by default; not used by the arithmetic.
    pub current_year: i32,
    pub prefix: String,
    pub suffix: String,
    /// Weekday index of the epoch's first day.
    pub start_day: u32,
}

/// How leap years are decided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum LeapYearRule {
    #[default]
    None,
    /// Divisible by 4, except centuries not divisible by 400. `month`, when
    /// present, gains `extra_days` in leap years.
    Gregorian {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        month: Option<MonthRef>,
        #[serde(default, rename = "extraDays", alias = "extra_days")]
        extra_days: u32,
    },
    /// Every `interval`-th year gains `extra_days` in `month`.
    Custom {
        interval: i32,
        month: MonthRef,
        #[serde(rename = "extraDays", alias = "extra_days")]
        extra_days: u32,
    },
}

impl LeapYearRule {
    /// The month that grows in leap years and by how much.
    pub const fn leap_month(&self) -> Option<(&MonthRef, u32)> {
        match self {
            Self::None
            | Self::Gregorian {
                month: None, ..
            } => None,
            Self::Gregorian {
                month: Some(month),
                extra_days,
            }
            | Self::Custom {
                month, extra_days, ..
            } => Some((month, *extra_days)),
        }
    }

    pub(crate) fn month_mut(&mut self) -> Option<&mut MonthRef> {
        match self {
            Self::None => None,
            Self::Gregorian { month, .. } => month.as_mut(),
            Self::Custom { month, .. } => Some(month),
        }
    }
}

/// A month named either by 1-based position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthRef {
    Index(u32),
    Name(String),
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u32> for MonthRef {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for MonthRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    pub days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeekday {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named day (or run of days) between two months that belongs to no month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntercalaryDay {
    pub name: String,
    #[serde(alias = "after")]
    pub after_month: MonthRef,
    #[serde(default = "default_intercalary_days", alias = "days")]
    pub days_count: u32,
    #[serde(default)]
    pub leap_year_only: bool,
    /// When false the whole period advances the weekday by nothing; the next
    /// ordinary day continues the week where the month left off.
    #[serde(default = "default_true")]
    pub counts_for_weekdays: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn default_intercalary_days() -> u32 {
    DEFAULT_INTERCALARY_DAYS
}

const fn default_true() -> bool {
    true
}

/// Time-of-day bases. Absent sections mean 24/60/60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeConfig {
    pub hours_in_day: u32,
    pub minutes_in_hour: u32,
    pub seconds_in_minute: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            hours_in_day: DEFAULT_HOURS_IN_DAY,
            minutes_in_hour: DEFAULT_MINUTES_IN_HOUR,
            seconds_in_minute: DEFAULT_SECONDS_IN_MINUTE,
        }
    }
}

impl TimeConfig {
    /// Seconds in one hour under these bases.
    pub const fn seconds_per_hour(&self) -> i64 {
        self.minutes_in_hour as i64 * self.seconds_in_minute as i64
    }

    /// Seconds in one day under these bases.
    pub const fn seconds_per_day(&self) -> i64 {
        self.hours_in_day as i64 * self.seconds_per_hour()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moon {
    pub name: String,
    /// Days from one new moon to the next.
    pub cycle_length: f64,
    pub first_new_moon: MoonEpoch,
    #[serde(default)]
    pub phases: Vec<MoonPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoonEpoch {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    pub name: String,
    /// Days the phase lasts.
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name: String,
    pub start_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_month: Option<u32>,
}

/// Named display templates. The engine never interprets them; they are carried
/// so variants can overlay them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormats {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub widgets: BTreeMap<String, DateFormat>,
    #[serde(flatten)]
    pub formats: BTreeMap<String, DateFormat>,
}

/// One template, or a set of named alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateFormat {
    Template(String),
    Named(BTreeMap<String, String>),
}

/// A named overlay declared inline on its base calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub config: VariantConfig,
    /// Kept untyped until resolution so one malformed overlay cannot stop the
    /// whole calendar from loading.
    #[serde(default)]
    pub overrides: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantConfig {
    /// Added to `year.epoch` and `year.currentYear` of the derived calendar.
    pub year_offset: Option<i32>,
}

impl CalendarDefinition {
    /// Parses a calendar from JSON and validates it.
    ///
    /// # Errors
    /// Returns every [`DefinitionError`] found; a JSON failure is reported alone.
    pub fn from_json_str(json: &str) -> Result<Self, Vec<DefinitionError>> {
        let definition: Self =
            serde_json::from_str(json).map_err(|e| vec![DefinitionError::Json(e.to_string())])?;
        definition.validate()?;
        Ok(definition)
    }

    /// Resolves a month reference to its 1-based number.
    pub fn month_number(&self, reference: &MonthRef) -> Option<u32> {
        match reference {
            MonthRef::Index(index) => {
                let count = u32::try_from(self.months.len()).ok()?;
                (1..=count).contains(index).then_some(*index)
            }
            MonthRef::Name(name) => self
                .months
                .iter()
                .position(|m| &m.name == name)
                .and_then(|i| u32::try_from(i + 1).ok()),
        }
    }

    /// Checks the structural rules the engine relies on.
    ///
    /// # Errors
    /// Returns all problems found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<DefinitionError>> {
        let mut errors = Vec::new();

        if self.months.is_empty() {
            errors.push(DefinitionError::EmptyMonths {
                id: self.id.clone(),
            });
        }
        if self.weekdays.is_empty() {
            errors.push(DefinitionError::EmptyWeekdays {
                id: self.id.clone(),
            });
        } else {
            let weekdays = u32::try_from(self.weekdays.len()).unwrap_or(u32::MAX);
            if self.year.start_day >= weekdays {
                errors.push(DefinitionError::StartDayOutOfRange {
                    start_day: self.year.start_day,
                    weekdays,
                });
            }
        }

        for day in &self.intercalary_days {
            if self.month_number(&day.after_month).is_none() {
                errors.push(DefinitionError::InvalidAfterMonth {
                    name: day.name.clone(),
                    reference: day.after_month.to_string(),
                });
            }
            if day.days_count == 0 {
                errors.push(DefinitionError::EmptyIntercalary {
                    name: day.name.clone(),
                });
            }
        }

        if let LeapYearRule::Custom { interval, .. } = self.leap_year {
            if interval < 1 {
                errors.push(DefinitionError::InvalidLeapInterval { interval });
            }
        }
        if let Some((month, _)) = self.leap_year.leap_month() {
            if self.month_number(month).is_none() {
                errors.push(DefinitionError::InvalidLeapMonth {
                    reference: month.to_string(),
                });
            }
        }

        for (unit, value) in [
            ("hoursInDay", self.time.hours_in_day),
            ("minutesInHour", self.time.minutes_in_hour),
            ("secondsInMinute", self.time.seconds_in_minute),
        ] {
            if value == 0 {
                errors.push(DefinitionError::ZeroTimeUnit { unit });
            }
        }

        for variant in self.variants.keys() {
            if !is_valid_variant_id(variant) {
                errors.push(DefinitionError::InvalidVariantId {
                    variant: variant.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub(crate) fn is_valid_variant_id(variant: &str) -> bool {
    !variant.is_empty() && !variant.contains([VARIANT_OPEN, VARIANT_CLOSE])
}
