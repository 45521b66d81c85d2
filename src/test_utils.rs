//! Calendar fixtures shared by unit tests.

use crate::engine::CalendarEngine;
use crate::types::{
    CalendarDefinition, CalendarMonth, CalendarWeekday, DateFormats, IntercalaryDay, LeapYearRule,
    MonthRef, TimeConfig, YearConfig,
};
use std::collections::BTreeMap;

pub fn months(table: &[(&str, u32)]) -> Vec<CalendarMonth> {
    table.iter()
        .map(|&(name, days)| CalendarMonth {
            name: name.to_owned(),
            abbreviation: None,
            days,
            description: None,
        })
        .collect()
}

pub fn weekdays(names: &[&str]) -> Vec<CalendarWeekday> {
    names
        .iter()
        .map(|&name| CalendarWeekday {
            name: name.to_owned(),
            abbreviation: None,
            description: None,
        })
        .collect()
}

pub fn intercalary(
    name: &str,
    after: u32,
    days: u32,
    leap_only: bool,
    counts: bool,
) -> IntercalaryDay {
    IntercalaryDay {
        name: name.to_owned(),
        after_month: MonthRef::Index(after),
        days_count: days,
        leap_year_only: leap_only,
        counts_for_weekdays: counts,
        description: None,
    }
}

pub fn definition(
    id: &str,
    month_table: &[(&str, u32)],
    weekday_names: &[&str],
) -> CalendarDefinition {
    CalendarDefinition {
        id: id.to_owned(),
        name: None,
        description: None,
        year: YearConfig::default(),
        leap_year: LeapYearRule::None,
        months: months(month_table),
        weekdays: weekdays(weekday_names),
        intercalary_days: Vec::new(),
        time: TimeConfig::default(),
        moons: Vec::new(),
        seasons: Vec::new(),
        date_formats: DateFormats::default(),
        variants: BTreeMap::new(),
    }
}

const WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Gregorian months, February growing in leap years, epoch year 1970 starting
/// on a Thursday (index 3).
pub fn gregorian() -> CalendarDefinition {
    let mut cal = definition(
        "gregorian",
        &[
            ("January", 31),
            ("February", 28),
            ("March", 31),
            ("April", 30),
            ("May", 31),
            ("June", 30),
            ("July", 31),
            ("August", 31),
            ("September", 30),
            ("October", 31),
            ("November", 30),
            ("December", 31),
        ],
        &WEEK,
    );
    cal.year.epoch = 1970;
    cal.year.current_year = 2024;
    cal.year.start_day = 3;
    cal.leap_year = LeapYearRule::Gregorian {
        month: Some(MonthRef::Name("February".to_owned())),
        extra_days: 1,
    };
    cal
}

/// Twelve 30-day months with festivals: one counting day after month 1, a
/// two-day non-counting festival after month 6, a leap-only day after month 7
/// (every fourth year), and a counting day after month 12. Ten-day week.
pub fn festival() -> CalendarDefinition {
    let mut cal = definition(
        "festival",
        &[
            ("Hammer", 30),
            ("Alturiak", 30),
            ("Ches", 30),
            ("Tarsakh", 30),
            ("Mirtul", 30),
            ("Kythorn", 30),
            ("Flamerule", 30),
            ("Eleasis", 30),
            ("Eleint", 30),
            ("Marpenoth", 30),
            ("Uktar", 30),
            ("Nightal", 30),
        ],
        &[
            "First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh", "Eighth", "Ninth",
            "Tenth",
        ],
    );
    cal.year.epoch = 1;
    cal.leap_year = LeapYearRule::Custom {
        interval: 4,
        month: MonthRef::Index(7),
        extra_days: 0,
    };
    cal.intercalary_days = vec![
        intercalary("Midwinter", 1, 1, false, true),
        intercalary("Greengrass", 6, 2, false, false),
        intercalary("Shieldmeet", 7, 1, true, true),
        intercalary("Feast of the Moon", 12, 1, false, true),
    ];
    cal
}

/// Four 14-day months, each followed by a non-counting intercalary day,
/// seven-day week. Every month starts on the same weekday.
pub fn frozen_week() -> CalendarDefinition {
    let mut cal = definition(
        "frozen-week",
        &[("One", 14), ("Two", 14), ("Three", 14), ("Four", 14)],
        &WEEK,
    );
    cal.intercalary_days = (1..=4)
        .map(|m| intercalary(&format!("Rest {m}"), m, 1, false, false))
        .collect();
    cal
}

/// Two 20-day months with a 10-hour day of 100-minute hours of 100-second
/// minutes and a three-day week.
pub fn decimal_time() -> CalendarDefinition {
    let mut cal = definition("decimal", &[("Alpha", 20), ("Beta", 20)], &["Un", "Deux", "Trois"]);
    cal.year.epoch = -3;
    cal.year.start_day = 2;
    cal.time = TimeConfig {
        hours_in_day: 10,
        minutes_in_hour: 100,
        seconds_in_minute: 100,
    };
    cal
}

pub fn engine(definition: CalendarDefinition) -> CalendarEngine {
    CalendarEngine::from_definition(definition)
}
