//! Calendar fixtures for integration tests, loaded from JSON the way a host
//! would load them.

#![allow(dead_code)]

use world_calendar::{CalendarDefinition, CalendarEngine};

pub const GREGORIAN: &str = r#"{
    "id": "gregorian",
    "name": "Gregorian",
    "year": { "epoch": 1970, "currentYear": 2024, "startDay": 3 },
    "leapYear": { "rule": "gregorian", "month": "February", "extraDays": 1 },
    "months": [
        { "name": "January", "abbreviation": "Jan", "days": 31 },
        { "name": "February", "abbreviation": "Feb", "days": 28 },
        { "name": "March", "abbreviation": "Mar", "days": 31 },
        { "name": "April", "abbreviation": "Apr", "days": 30 },
        { "name": "May", "abbreviation": "May", "days": 31 },
        { "name": "June", "abbreviation": "Jun", "days": 30 },
        { "name": "July", "abbreviation": "Jul", "days": 31 },
        { "name": "August", "abbreviation": "Aug", "days": 31 },
        { "name": "September", "abbreviation": "Sep", "days": 30 },
        { "name": "October", "abbreviation": "Oct", "days": 31 },
        { "name": "November", "abbreviation": "Nov", "days": 30 },
        { "name": "December", "abbreviation": "Dec", "days": 31 }
    ],
    "weekdays": [
        { "name": "Monday" }, { "name": "Tuesday" }, { "name": "Wednesday" },
        { "name": "Thursday" }, { "name": "Friday" }, { "name": "Saturday" },
        { "name": "Sunday" }
    ]
}"#;

/// Harptos-style year: twelve 30-day months, tendays, five festivals, one of
/// them leap-only.
pub const HARPTOS: &str = r#"{
    "id": "harptos",
    "year": { "epoch": 1480, "currentYear": 1492, "suffix": " DR" },
    "leapYear": { "rule": "custom", "interval": 4, "month": "Flamerule", "extraDays": 0 },
    "months": [
        { "name": "Hammer", "days": 30 }, { "name": "Alturiak", "days": 30 },
        { "name": "Ches", "days": 30 }, { "name": "Tarsakh", "days": 30 },
        { "name": "Mirtul", "days": 30 }, { "name": "Kythorn", "days": 30 },
        { "name": "Flamerule", "days": 30 }, { "name": "Eleasis", "days": 30 },
        { "name": "Eleint", "days": 30 }, { "name": "Marpenoth", "days": 30 },
        { "name": "Uktar", "days": 30 }, { "name": "Nightal", "days": 30 }
    ],
    "weekdays": [
        { "name": "First-day" }, { "name": "Second-day" }, { "name": "Third-day" },
        { "name": "Fourth-day" }, { "name": "Fifth-day" }, { "name": "Sixth-day" },
        { "name": "Seventh-day" }, { "name": "Eighth-day" }, { "name": "Ninth-day" },
        { "name": "Tenth-day" }
    ],
    "intercalaryDays": [
        { "name": "Midwinter", "afterMonth": "Hammer", "countsForWeekdays": false },
        { "name": "Greengrass", "afterMonth": "Tarsakh", "countsForWeekdays": false },
        { "name": "Midsummer", "afterMonth": "Flamerule", "countsForWeekdays": false },
        { "name": "Shieldmeet", "afterMonth": "Flamerule",
          "leapYearOnly": true, "countsForWeekdays": false },
        { "name": "Highharvestide", "afterMonth": "Eleint", "countsForWeekdays": false },
        { "name": "Feast of the Moon", "afterMonth": "Uktar", "countsForWeekdays": false }
    ]
}"#;

/// Three months with a multi-day festival that does count for weekdays, an
/// eight-day week and 20/50/50 time bases.
pub const ODD_TIME: &str = r#"{
    "id": "odd-time",
    "year": { "epoch": 0, "startDay": 5 },
    "leapYear": { "rule": "custom", "interval": 3, "month": 2, "extraDays": 2 },
    "months": [
        { "name": "Sow", "days": 27 }, { "name": "Grow", "days": 26 },
        { "name": "Reap", "days": 29 }
    ],
    "weekdays": [
        { "name": "A" }, { "name": "B" }, { "name": "C" }, { "name": "D" },
        { "name": "E" }, { "name": "F" }, { "name": "G" }, { "name": "H" }
    ],
    "intercalary": [
        { "name": "Long Night", "after": 3, "days": 3 },
        { "name": "Eclipse", "after": 1, "days": 2,
          "leapYearOnly": true, "countsForWeekdays": false }
    ],
    "time": { "hoursInDay": 20, "minutesInHour": 50, "secondsInMinute": 50 }
}"#;

/// A base calendar with inline variants, one of them the default.
pub const GOLARION: &str = r#"{
    "id": "golarion",
    "year": { "epoch": 4700, "currentYear": 4725, "suffix": " AR" },
    "leapYear": { "rule": "custom", "interval": 8, "month": "Calistril", "extraDays": 1 },
    "months": [
        { "name": "Abadius", "days": 31 }, { "name": "Calistril", "days": 28 },
        { "name": "Pharast", "days": 31 }, { "name": "Gozran", "days": 30 }
    ],
    "weekdays": [
        { "name": "Moonday" }, { "name": "Toilday" }, { "name": "Wealday" },
        { "name": "Oathday" }, { "name": "Fireday" }, { "name": "Starday" }, { "name": "Sunday" }
    ],
    "moons": [
        { "name": "Somal", "cycleLength": 29.5,
          "firstNewMoon": { "year": 4700, "month": 1, "day": 8 } }
    ],
    "dateFormats": {
        "short": "{{d}} {{m}}",
        "widgets": { "mini": "{{d}}", "full": "{{w}} {{d}} {{m}}" }
    },
    "variants": {
        "absalom": {
            "name": "Absalom Reckoning",
            "default": true,
            "overrides": {
                "months": { "Abadius": { "name": "Prima" } },
                "dateFormats": { "widgets": { "mini": "{{d}}*" } }
            }
        },
        "imperial": {
            "name": "Imperial Calendar",
            "config": { "yearOffset": 5200 },
            "overrides": { "year": { "suffix": " IC" }, "moons": [] }
        },
        "broken": {
            "name": "Broken",
            "overrides": { "weekdays": "Moonday" }
        }
    }
}"#;

pub fn load(json: &str) -> CalendarDefinition {
    CalendarDefinition::from_json_str(json).expect("fixture calendar should load")
}

pub fn engine(json: &str) -> CalendarEngine {
    CalendarEngine::from_definition(load(json))
}
