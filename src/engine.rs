//! Calendar arithmetic over one [`CalendarDefinition`].
//!
//! Every operation is a pure function of the definition and its arguments.
//! A year is laid out as a run of slots: each month's days, then the
//! intercalary periods that follow it in declaration order. World time counts
//! seconds from the first slot of the epoch year.
//!
//! ```text
//! WorldTime ──div spd──► epoch day ──year_containing()──► (year, ordinal)
//!                                                   │
//!                                      slot_at() ◄──┘
//!                                          │
//!                                          ▼
//!                        Slot::Day { month, day } | Slot::Intercalary { .. }
//! ```
//!
//! Arguments out of range are clamped rather than rejected; see [`Clamped`].

use crate::consts::{CENTURY_CYCLE, FIRST_DAY, FIRST_MONTH, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE};
use crate::date::{CalendarDate, TimeOfDay, WorldTime};
use crate::error::{CalendarError, Clamped};
use crate::types::{CalendarDefinition, IntercalaryDay, LeapYearRule};
use std::sync::Arc;
use tracing::{debug, warn};

/// An intercalary period with its month reference resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Intercalary {
    /// Position in `CalendarDefinition::intercalary_days`.
    index: usize,
    after: u32,
    days: u32,
    leap_only: bool,
    counts: bool,
}

impl Intercalary {
    const fn applies(&self, leap: bool) -> bool {
        !self.leap_only || leap
    }
}

/// Where a day sits inside its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Day { month: u32, day: u32 },
    /// `entry` indexes `CalendarEngine::intercalary`.
    Intercalary { entry: usize, day: u32 },
}

/// Length of a common and a leap year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct YearDays {
    common: i64,
    leap: i64,
}

impl YearDays {
    const fn get(self, leap: bool) -> i64 {
        if leap { self.leap } else { self.common }
    }
}

/// Converts between world time and dates of one calendar.
///
/// Cheap to clone; the definition is shared.
#[derive(Debug, Clone)]
pub struct CalendarEngine {
    definition: Arc<CalendarDefinition>,
    intercalary: Vec<Intercalary>,
    /// `(month, extra days)` for rules that lengthen a month in leap years.
    leap_month: Option<(u32, u32)>,
    year_days: YearDays,
    /// Year lengths counting only days that advance the weekday.
    weekday_year_days: YearDays,
}

impl CalendarEngine {
    pub fn new(definition: Arc<CalendarDefinition>) -> Self {
        let intercalary = definition
            .intercalary_days
            .iter()
            .enumerate()
            .filter_map(|(index, day)| {
                let Some(after) = definition.month_number(&day.after_month) else {
                    warn!(
                        calendar = %definition.id,
                        intercalary = %day.name,
                        after = %day.after_month,
                        "intercalary day follows an unknown month, ignored"
                    );
                    return None;
                };
                Some(Intercalary {
                    index,
                    after,
                    days: day.days_count,
                    leap_only: day.leap_year_only,
                    counts: day.counts_for_weekdays,
                })
            })
            .collect();
        let leap_month = definition
            .leap_year
            .leap_month()
            .and_then(|(month, extra)| definition.month_number(month).map(|m| (m, extra)));

        let mut engine = Self {
            definition,
            intercalary,
            leap_month,
            year_days: YearDays::default(),
            weekday_year_days: YearDays::default(),
        };
        engine.year_days = YearDays {
            common: engine.count_year_days(false, false),
            leap: engine.count_year_days(true, false),
        };
        engine.weekday_year_days = YearDays {
            common: engine.count_year_days(false, true),
            leap: engine.count_year_days(true, true),
        };

        if engine.cycle_days() <= 0 {
            warn!(calendar = %engine.id(), "calendar has no days; every time maps onto the epoch");
        }
        debug!(
            calendar = %engine.id(),
            common_year = engine.year_days.common,
            leap_year = engine.year_days.leap,
            "calendar engine ready"
        );
        engine
    }

    pub fn from_definition(definition: CalendarDefinition) -> Self {
        Self::new(Arc::new(definition))
    }

    pub fn definition(&self) -> &CalendarDefinition {
        &self.definition
    }

    /// Shared handle to the definition.
    pub fn shared_definition(&self) -> Arc<CalendarDefinition> {
        Arc::clone(&self.definition)
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn month_count(&self) -> u32 {
        u32::try_from(self.definition.months.len()).unwrap_or(u32::MAX)
    }

    /// Weekday modulus, never zero.
    pub fn weekday_count(&self) -> u32 {
        u32::try_from(self.definition.weekdays.len())
            .unwrap_or(u32::MAX)
            .max(1)
    }

    pub fn seconds_per_day(&self) -> i64 {
        self.definition.time.seconds_per_day().max(1)
    }

    pub fn month_name(&self, month: u32) -> Option<&str> {
        let index = usize::try_from(month.checked_sub(FIRST_MONTH)?).ok()?;
        self.definition.months.get(index).map(|m| m.name.as_str())
    }

    pub fn weekday_name(&self, weekday: u32) -> Option<&str> {
        let index = usize::try_from(weekday).ok()?;
        self.definition.weekdays.get(index).map(|w| w.name.as_str())
    }

    // --- leap years and lengths ---

    pub fn is_leap_year(&self, year: i32) -> bool {
        let year = i64::from(year);
        match &self.definition.leap_year {
            LeapYearRule::None => false,
            LeapYearRule::Gregorian { .. } => {
                year.rem_euclid(LEAP_YEAR_CYCLE) == 0
                    && (year.rem_euclid(CENTURY_CYCLE) != 0
                        || year.rem_euclid(GREGORIAN_CYCLE) == 0)
            }
            LeapYearRule::Custom { interval, .. } => {
                *interval > 0 && year.rem_euclid(i64::from(*interval)) == 0
            }
        }
    }

    /// Days in `month` of `year`, leap days included.
    pub fn month_length(&self, month: u32, year: i32) -> Clamped<u32> {
        let (month, issue) = self.clamp_month(month);
        Clamped::with_issue(self.month_len(month, self.is_leap_year(year)), issue)
    }

    /// Days in `year`: every month plus every intercalary period that occurs.
    pub fn year_length(&self, year: i32) -> u32 {
        to_u32(self.year_days.get(self.is_leap_year(year)))
    }

    /// Signed day count from the first day of the epoch year to the first day
    /// of `year`.
    pub fn days_before_year(&self, year: i32) -> i64 {
        self.days_before(i64::from(year), self.year_days)
    }

    /// Intercalary periods directly after `month` in `year`.
    pub fn intercalary_days_after_month(
        &self,
        month: u32,
        year: i32,
    ) -> Clamped<Vec<&IntercalaryDay>> {
        let (month, issue) = self.clamp_month(month);
        let days = self
            .intercalary_after(month, self.is_leap_year(year))
            .map(|ic| &self.definition.intercalary_days[ic.index])
            .collect();
        Clamped::with_issue(days, issue)
    }

    /// Intercalary periods directly before `month` in `year`.
    ///
    /// For the first month these are the periods closing the previous year.
    pub fn intercalary_days_before_month(
        &self,
        month: u32,
        year: i32,
    ) -> Clamped<Vec<&IntercalaryDay>> {
        let (month, issue) = self.clamp_month(month);
        let (after, year) = if month == FIRST_MONTH {
            (self.month_count(), year.saturating_sub(1))
        } else {
            (month - 1, year)
        };
        let days = self
            .intercalary_after(after, self.is_leap_year(year))
            .map(|ic| &self.definition.intercalary_days[ic.index])
            .collect();
        Clamped::with_issue(days, issue)
    }

    // --- construction ---

    /// Builds an ordinary date, clamping month and day into range. A month
    /// without days yields the next day that exists.
    pub fn date(&self, year: i32, month: u32, day: u32) -> Clamped<CalendarDate> {
        let (month, day, issue) = self.clamp_ymd(year, month, day);
        Clamped::with_issue(self.build_day(year, month, day, None), issue)
    }

    /// Builds an ordinary date.
    ///
    /// # Errors
    /// Returns [`CalendarError::MonthOutOfRange`] or
    /// [`CalendarError::DayOutOfRange`] instead of clamping.
    pub fn try_date(&self, year: i32, month: u32, day: u32) -> Result<CalendarDate, CalendarError> {
        self.date(year, month, day).into_result()
    }

    /// Builds day `day` of the intercalary period `name` in `year`. When
    /// several periods share the name, the first declared is used.
    ///
    /// # Errors
    /// Returns an error when the period is unknown, does not occur in `year`,
    /// or is shorter than `day`.
    pub fn intercalary_date(
        &self,
        year: i32,
        name: &str,
        day: u32,
    ) -> Result<CalendarDate, CalendarError> {
        let (entry, ic) = self
            .intercalary_entry(name, None)
            .ok_or_else(|| CalendarError::UnknownIntercalary {
                name: name.to_owned(),
            })?;
        if !ic.applies(self.is_leap_year(year)) {
            return Err(CalendarError::IntercalaryNotInYear {
                name: name.to_owned(),
                year,
            });
        }
        if !(FIRST_DAY..=ic.days).contains(&day) {
            return Err(CalendarError::DayOutOfRange {
                day,
                month: ic.after,
                year,
                max_day: ic.days,
            });
        }
        Ok(self.build(year, Slot::Intercalary { entry, day }, None))
    }

    /// Attaches a time-of-day, clamping each component to the time bases.
    pub fn with_time(&self, date: &CalendarDate, time: TimeOfDay) -> Clamped<CalendarDate> {
        let (clamped, issue) = self.clamp_time(time);
        let slot = self.slot_of(date);
        Clamped::with_issue(self.build(date.year(), slot, Some(clamped)), issue)
    }

    /// Checks a date against this calendar without changing it.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate_date(&self, date: &CalendarDate) -> Result<(), CalendarError> {
        if let Some(name) = date.intercalary() {
            let (_, ic) = self
                .intercalary_entry(name, Some(date.month()))
                .ok_or_else(|| CalendarError::UnknownIntercalary {
                    name: name.to_owned(),
                })?;
            if !ic.applies(self.is_leap_year(date.year())) {
                return Err(CalendarError::IntercalaryNotInYear {
                    name: name.to_owned(),
                    year: date.year(),
                });
            }
            if !(FIRST_DAY..=ic.days).contains(&date.day()) {
                return Err(CalendarError::DayOutOfRange {
                    day: date.day(),
                    month: ic.after,
                    year: date.year(),
                    max_day: ic.days,
                });
            }
        } else if let (_, _, Some(issue)) = self.clamp_ymd(date.year(), date.month(), date.day()) {
            return Err(issue);
        }
        if date.weekday() >= self.weekday_count() {
            return Err(CalendarError::WeekdayOutOfRange {
                weekday: date.weekday(),
                weekdays: self.weekday_count(),
            });
        }
        if let Some(time) = date.time() {
            if let (_, Some(issue)) = self.clamp_time(time) {
                return Err(issue);
            }
        }
        Ok(())
    }

    // --- ordinals and weekdays ---

    /// 0-based position of `date` within its year, intercalary days included.
    pub fn day_of_year(&self, date: &CalendarDate) -> u32 {
        let slot = self.slot_of(date);
        to_u32(self.ordinal(slot, self.is_leap_year(date.year()), false))
    }

    /// The date `ordinal` days after the first day of `year`. Ordinals past
    /// the end of the year roll into the following years.
    pub fn date_from_day_of_year(&self, year: i32, ordinal: u32) -> CalendarDate {
        let days = self.days_before_year(year).saturating_add(i64::from(ordinal));
        self.date_from_epoch_day(days, None)
    }

    /// Weekday index of an ordinary date.
    ///
    /// Intercalary periods that do not count for weekdays contribute nothing,
    /// so the day after one continues the week of the day before it.
    pub fn calculate_weekday(&self, year: i32, month: u32, day: u32) -> Clamped<u32> {
        let (month, day, issue) = self.clamp_ymd(year, month, day);
        Clamped::with_issue(self.weekday_at(year, Slot::Day { month, day }), issue)
    }

    /// Signed number of days from `from` to `to`.
    pub fn days_between(&self, from: &CalendarDate, to: &CalendarDate) -> i64 {
        self.epoch_day_of(to) - self.epoch_day_of(from)
    }

    // --- world time ---

    /// Seconds from the epoch to `date`, shifted by `world_creation_offset`.
    /// A date without a time-of-day is taken at midnight.
    pub fn date_to_world_time(&self, date: &CalendarDate, world_creation_offset: i64) -> WorldTime {
        let days = self.epoch_day_of(date);
        let seconds = date.time().map_or(0, |t| self.encode_time(t));
        WorldTime::new(
            days.saturating_mul(self.seconds_per_day())
                .saturating_add(seconds)
                .saturating_add(world_creation_offset),
        )
    }

    /// The date and time-of-day at `time`, after removing
    /// `world_creation_offset`.
    pub fn world_time_to_date(&self, time: WorldTime, world_creation_offset: i64) -> CalendarDate {
        let local = time.seconds().saturating_sub(world_creation_offset);
        let spd = self.seconds_per_day();
        let days = local.div_euclid(spd);
        let time = self.decode_time(local.rem_euclid(spd));
        self.date_from_epoch_day(days, Some(time))
    }

    // --- arithmetic ---

    /// Moves `date` by `seconds` on the world time axis. Dates without a
    /// time-of-day stay without one.
    pub fn add_seconds(&self, date: &CalendarDate, seconds: i64) -> CalendarDate {
        let time = self.date_to_world_time(date, 0).offset_by(seconds);
        let moved = self.world_time_to_date(time, 0);
        if date.time().is_none() { moved.without_time() } else { moved }
    }

    pub fn add_minutes(&self, date: &CalendarDate, minutes: i64) -> CalendarDate {
        let unit = i64::from(self.definition.time.seconds_in_minute);
        self.add_seconds(date, minutes.saturating_mul(unit))
    }

    pub fn add_hours(&self, date: &CalendarDate, hours: i64) -> CalendarDate {
        let unit = self.definition.time.seconds_per_hour();
        self.add_seconds(date, hours.saturating_mul(unit))
    }

    pub fn add_days(&self, date: &CalendarDate, days: i64) -> CalendarDate {
        self.add_seconds(date, days.saturating_mul(self.seconds_per_day()))
    }

    /// Adds whole weeks of this calendar's own length.
    pub fn add_weeks(&self, date: &CalendarDate, weeks: i64) -> CalendarDate {
        let days = weeks.saturating_mul(i64::from(self.weekday_count()));
        self.add_days(date, days)
    }

    /// Adds calendar months, keeping the day where possible and otherwise
    /// falling back to the last day of the target month. Intercalary dates
    /// move from the end of the month they follow.
    pub fn add_months(&self, date: &CalendarDate, months: i64) -> CalendarDate {
        let (month, day) = match self.slot_of(date) {
            Slot::Day { month, day } => (month, day),
            Slot::Intercalary { entry, .. } => {
                let after = self.intercalary[entry].after;
                (after, self.month_len(after, self.is_leap_year(date.year())))
            }
        };
        let count = i64::from(self.month_count().max(FIRST_MONTH));
        let index = i64::from(month - FIRST_MONTH).saturating_add(months);
        let year = clamp_year(i64::from(date.year()).saturating_add(index.div_euclid(count)));
        let month = to_u32(index.rem_euclid(count)) + FIRST_MONTH;
        self.build_day(year, month, day, date.time())
    }

    /// Adds years, keeping month and day where possible. Leap-only
    /// intercalary dates land on the end of their month in years without them.
    pub fn add_years(&self, date: &CalendarDate, years: i64) -> CalendarDate {
        let year = clamp_year(i64::from(date.year()).saturating_add(years));
        let leap = self.is_leap_year(year);
        match self.slot_of(date) {
            Slot::Intercalary { entry, day } if self.intercalary[entry].applies(leap) => {
                self.build(year, Slot::Intercalary { entry, day }, date.time())
            }
            Slot::Intercalary { entry, .. } => {
                let month = self.intercalary[entry].after;
                self.build_day(year, month, self.month_len(month, leap), date.time())
            }
            Slot::Day { month, day } => self.build_day(year, month, day, date.time()),
        }
    }

    // --- internals ---

    fn month_len(&self, month: u32, leap: bool) -> u32 {
        let base = month
            .checked_sub(FIRST_MONTH)
            .and_then(|i| self.definition.months.get(i as usize))
            .map_or(0, |m| m.days);
        match self.leap_month {
            Some((leap_month, extra)) if leap && leap_month == month => base.saturating_add(extra),
            _ => base,
        }
    }

    fn intercalary_after(&self, month: u32, leap: bool) -> impl Iterator<Item = &Intercalary> + '_ {
        self.intercalary
            .iter()
            .filter(move |ic| ic.after == month && ic.applies(leap))
    }

    /// Looks a period up by name. When several share the name, the one
    /// following `after` wins, then the first declared.
    fn intercalary_entry(&self, name: &str, after: Option<u32>) -> Option<(usize, Intercalary)> {
        let named = || {
            self.intercalary
                .iter()
                .copied()
                .enumerate()
                .filter(move |(_, ic)| self.definition.intercalary_days[ic.index].name == name)
        };
        after
            .and_then(|month| named().find(|(_, ic)| ic.after == month))
            .or_else(|| named().next())
    }

    fn count_year_days(&self, leap: bool, weekdays_only: bool) -> i64 {
        let months: i64 = (FIRST_MONTH..=self.month_count())
            .map(|m| i64::from(self.month_len(m, leap)))
            .sum();
        let extra: i64 = self
            .intercalary
            .iter()
            .filter(|ic| ic.applies(leap) && (!weekdays_only || ic.counts))
            .map(|ic| i64::from(ic.days))
            .sum();
        months + extra
    }

    /// Signed count of leap years in `[0, year)`; negative below zero.
    fn leap_years_before(&self, year: i64) -> i64 {
        match &self.definition.leap_year {
            LeapYearRule::None => 0,
            LeapYearRule::Gregorian { .. } => {
                ceil_div(year, LEAP_YEAR_CYCLE) - ceil_div(year, CENTURY_CYCLE)
                    + ceil_div(year, GREGORIAN_CYCLE)
            }
            LeapYearRule::Custom { interval, .. } if *interval > 0 => {
                ceil_div(year, i64::from(*interval))
            }
            LeapYearRule::Custom { .. } => 0,
        }
    }

    /// Years after which the leap pattern repeats.
    fn cycle_years(&self) -> i64 {
        match &self.definition.leap_year {
            LeapYearRule::None => 1,
            LeapYearRule::Gregorian { .. } => GREGORIAN_CYCLE,
            LeapYearRule::Custom { interval, .. } => i64::from(*interval).max(1),
        }
    }

    fn cycle_days(&self) -> i64 {
        let epoch = i64::from(self.definition.year.epoch);
        self.days_before(epoch.saturating_add(self.cycle_years()), self.year_days)
    }

    /// Sum of year lengths from the epoch year up to `year`, negated below it.
    fn days_before(&self, year: i64, lengths: YearDays) -> i64 {
        let epoch = i64::from(self.definition.year.epoch);
        let leaps = self.leap_years_before(year) - self.leap_years_before(epoch);
        (year - epoch)
            .saturating_mul(lengths.common)
            .saturating_add(leaps.saturating_mul(lengths.leap - lengths.common))
    }

    /// Days before `slot` within its year. With `weekdays_only`, intercalary
    /// periods that do not count for weekdays are skipped.
    fn ordinal(&self, slot: Slot, leap: bool, weekdays_only: bool) -> i64 {
        let counted = |ic: &Intercalary| ic.applies(leap) && (!weekdays_only || ic.counts);
        let months_through = |last: u32| -> i64 {
            (FIRST_MONTH..=last)
                .map(|m| i64::from(self.month_len(m, leap)))
                .sum()
        };
        match slot {
            Slot::Day { month, day } => {
                let extra: i64 = self
                    .intercalary
                    .iter()
                    .filter(|ic| ic.after < month && counted(*ic))
                    .map(|ic| i64::from(ic.days))
                    .sum();
                months_through(month - FIRST_MONTH) + extra + i64::from(day) - 1
            }
            Slot::Intercalary { entry, day } => {
                let this = self.intercalary[entry];
                let extra: i64 = self
                    .intercalary
                    .iter()
                    .enumerate()
                    .filter(|&(i, ic)| {
                        (ic.after < this.after || (ic.after == this.after && i < entry))
                            && counted(ic)
                    })
                    .map(|(_, ic)| i64::from(ic.days))
                    .sum();
                let own = if weekdays_only && !this.counts {
                    0
                } else {
                    i64::from(day) - 1
                };
                months_through(this.after) + extra + own
            }
        }
    }

    /// Walks the slots of one year to the one holding `remaining`.
    fn slot_at(&self, leap: bool, mut remaining: i64) -> Slot {
        let mut last = Slot::Day {
            month: FIRST_MONTH,
            day: FIRST_DAY,
        };
        for month in FIRST_MONTH..=self.month_count() {
            let len = self.month_len(month, leap);
            if remaining < i64::from(len) {
                return Slot::Day {
                    month,
                    day: to_u32(remaining) + FIRST_DAY,
                };
            }
            remaining -= i64::from(len);
            if len > 0 {
                last = Slot::Day { month, day: len };
            }
            for (entry, ic) in self.intercalary.iter().enumerate() {
                if ic.after != month || !ic.applies(leap) {
                    continue;
                }
                if remaining < i64::from(ic.days) {
                    return Slot::Intercalary {
                        entry,
                        day: to_u32(remaining) + FIRST_DAY,
                    };
                }
                remaining -= i64::from(ic.days);
                if ic.days > 0 {
                    last = Slot::Intercalary {
                        entry,
                        day: ic.days,
                    };
                }
            }
        }
        last
    }

    /// The year whose days include epoch day `days`.
    fn year_containing(&self, days: i64) -> Option<i32> {
        let cycle_days = self.cycle_days();
        if cycle_days <= 0 {
            return None;
        }
        let epoch = i64::from(self.definition.year.epoch);
        let estimate = i128::from(days) * i128::from(self.cycle_years()) / i128::from(cycle_days);
        let estimate =
            i64::try_from(estimate).unwrap_or(if estimate < 0 { i64::MIN } else { i64::MAX });
        let mut year = clamp_year(epoch.saturating_add(estimate));
        while year > i32::MIN && self.days_before_year(year) > days {
            year -= 1;
        }
        while year < i32::MAX && self.days_before_year(year + 1) <= days {
            year += 1;
        }
        Some(year)
    }

    fn date_from_epoch_day(&self, days: i64, time: Option<TimeOfDay>) -> CalendarDate {
        let Some(year) = self.year_containing(days) else {
            warn!(calendar = %self.id(), days, "calendar has no days, returning the epoch");
            let first = Slot::Day {
                month: FIRST_MONTH,
                day: FIRST_DAY,
            };
            return self.build(self.definition.year.epoch, first, time);
        };
        let ordinal = days.saturating_sub(self.days_before_year(year)).max(0);
        let slot = self.slot_at(self.is_leap_year(year), ordinal);
        self.build(year, slot, time)
    }

    fn epoch_day_of(&self, date: &CalendarDate) -> i64 {
        let slot = self.slot_of(date);
        self.days_before_year(date.year())
            .saturating_add(self.ordinal(slot, self.is_leap_year(date.year()), false))
    }

    fn weekday_at(&self, year: i32, slot: Slot) -> u32 {
        let elapsed = self
            .days_before(i64::from(year), self.weekday_year_days)
            .saturating_add(self.ordinal(slot, self.is_leap_year(year), true));
        let raw = i64::from(self.definition.year.start_day).saturating_add(elapsed);
        to_u32(raw.rem_euclid(i64::from(self.weekday_count())))
    }

    /// Resolves a date to a slot of this calendar, clamping what does not fit.
    fn slot_of(&self, date: &CalendarDate) -> Slot {
        let year = date.year();
        let leap = self.is_leap_year(year);
        if let Some(name) = date.intercalary() {
            match self.intercalary_entry(name, Some(date.month())) {
                Some((entry, ic)) if ic.applies(leap) => {
                    let day = date.day().clamp(FIRST_DAY, ic.days.max(FIRST_DAY));
                    if day != date.day() {
                        warn!(
                            calendar = %self.id(),
                            intercalary = name,
                            day = date.day(),
                            "intercalary day clamped"
                        );
                    }
                    return Slot::Intercalary { entry, day };
                }
                _ => {
                    warn!(
                        calendar = %self.id(),
                        intercalary = name,
                        year,
                        "intercalary day does not occur in this year, using the end of its month"
                    );
                }
            }
            let (month, _) = self.clamp_month(date.month());
            return Slot::Day {
                month,
                day: self.month_len(month, leap).max(FIRST_DAY),
            };
        }
        let (month, day, issue) = self.clamp_ymd(year, date.month(), date.day());
        if let Some(issue) = issue {
            warn!(calendar = %self.id(), %issue, "date outside calendar, clamped");
        }
        Slot::Day { month, day }
    }

    fn build(&self, year: i32, slot: Slot, time: Option<TimeOfDay>) -> CalendarDate {
        let weekday = self.weekday_at(year, slot);
        match slot {
            Slot::Day { month, day } => {
                CalendarDate::from_parts(year, month, day, weekday, None, time)
            }
            Slot::Intercalary { entry, day } => {
                let ic = self.intercalary[entry];
                let name = self.definition.intercalary_days[ic.index].name.clone();
                CalendarDate::from_parts(year, ic.after, day, weekday, Some(name), time)
            }
        }
    }

    /// Builds `day` of `month`, clamped to the month's length. A month with
    /// no days in `year` resolves to the next day that exists.
    fn build_day(&self, year: i32, month: u32, day: u32, time: Option<TimeOfDay>) -> CalendarDate {
        let leap = self.is_leap_year(year);
        let len = self.month_len(month, leap);
        if len == 0 {
            let start = Slot::Day {
                month,
                day: FIRST_DAY,
            };
            let days = self
                .days_before_year(year)
                .saturating_add(self.ordinal(start, leap, false));
            return self.date_from_epoch_day(days, time);
        }
        let day = day.clamp(FIRST_DAY, len);
        self.build(year, Slot::Day { month, day }, time)
    }

    fn clamp_month(&self, month: u32) -> (u32, Option<CalendarError>) {
        let months = self.month_count();
        let clamped = month.clamp(FIRST_MONTH, months.max(FIRST_MONTH));
        let issue = (clamped != month).then_some(CalendarError::MonthOutOfRange { month, months });
        (clamped, issue)
    }

    fn clamp_ymd(&self, year: i32, month: u32, day: u32) -> (u32, u32, Option<CalendarError>) {
        let (month, month_issue) = self.clamp_month(month);
        let max_day = self.month_len(month, self.is_leap_year(year));
        let clamped = day.clamp(FIRST_DAY, max_day.max(FIRST_DAY));
        let day_issue = (clamped != day || day > max_day).then_some(CalendarError::DayOutOfRange {
            day,
            month,
            year,
            max_day,
        });
        (month, clamped, month_issue.or(day_issue))
    }

    fn clamp_time(&self, time: TimeOfDay) -> (TimeOfDay, Option<CalendarError>) {
        let bases = self.definition.time;
        let clamped = TimeOfDay::new(
            time.hour.min(bases.hours_in_day.saturating_sub(1)),
            time.minute.min(bases.minutes_in_hour.saturating_sub(1)),
            time.second.min(bases.seconds_in_minute.saturating_sub(1)),
        );
        let issue = (clamped != time).then_some(CalendarError::TimeOutOfRange {
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        });
        (clamped, issue)
    }

    fn encode_time(&self, time: TimeOfDay) -> i64 {
        let bases = self.definition.time;
        i64::from(time.hour) * bases.seconds_per_hour()
            + i64::from(time.minute) * i64::from(bases.seconds_in_minute)
            + i64::from(time.second)
    }

    fn decode_time(&self, seconds: i64) -> TimeOfDay {
        let bases = self.definition.time;
        let per_hour = bases.seconds_per_hour().max(1);
        let per_minute = i64::from(bases.seconds_in_minute).max(1);
        TimeOfDay::new(
            to_u32(seconds / per_hour),
            to_u32(seconds % per_hour / per_minute),
            to_u32(seconds % per_minute),
        )
    }
}

/// Ceiling division; counts multiples of `b` in `[0, a)`, negated for `a < 0`.
const fn ceil_div(a: i64, b: i64) -> i64 {
    -((-a).div_euclid(b))
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn clamp_year(year: i64) -> i32 {
    i32::try_from(year).unwrap_or(if year < 0 { i32::MIN } else { i32::MAX })
}
