/// Hours in a day when a calendar omits its `time` section
pub const DEFAULT_HOURS_IN_DAY: u32 = 24;
/// Minutes in an hour when a calendar omits its `time` section
pub const DEFAULT_MINUTES_IN_HOUR: u32 = 60;
/// Seconds in a minute when a calendar omits its `time` section
pub const DEFAULT_SECONDS_IN_MINUTE: u32 = 60;

/// First month number (months are 1-indexed)
pub const FIRST_MONTH: u32 = 1;
/// First day of a month or intercalary period, used for lower bounds
pub const FIRST_DAY: u32 = 1;

/// Intercalary periods span one day unless `daysCount` says otherwise
pub const DEFAULT_INTERCALARY_DAYS: u32 = 1;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i64 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i64 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i64 = 400;

/// Opens the variant part of a derived calendar id: `base(variant)`
pub const VARIANT_OPEN: char = '(';
/// Closes the variant part of a derived calendar id: `base(variant)`
pub const VARIANT_CLOSE: char = ')';
