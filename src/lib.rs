//! Calendar arithmetic for user-defined calendars.
//!
//! A [`CalendarDefinition`] describes one calendar: months of any length,
//! a leap rule, named intercalary days that belong to no month, a weekday
//! cycle and the hour/minute/second bases of its day. A [`CalendarEngine`]
//! converts between [`WorldTime`] (seconds on the host's time axis) and
//! [`CalendarDate`] values of that calendar, and does date arithmetic on them.
//!
//! ```
//! use world_calendar::{CalendarDefinition, CalendarEngine, WorldTime};
//!
//! let json = r#"{
//!     "id": "two-moons",
//!     "year": { "epoch": 1 },
//!     "months": [{ "name": "Ember", "days": 20 }, { "name": "Frost", "days": 20 }],
//!     "weekdays": [{ "name": "Sun" }, { "name": "Moon" }, { "name": "Star" }],
//!     "intercalary": [{ "name": "Thaw", "after": "Frost", "countsForWeekdays": false }]
//! }"#;
//! let engine = CalendarEngine::from_definition(CalendarDefinition::from_json_str(json).unwrap());
//!
//! let date = engine.world_time_to_date(WorldTime::new(40 * 86_400), 0);
//! assert_eq!(date.intercalary(), Some("Thaw"));
//! assert_eq!(engine.add_days(&date, 1).ymd(), (2, 1, 1));
//! ```
//!
//! Variants derive new calendars from a base one (see [`variant`]), a
//! [`CalendarRegistry`] keeps one engine per calendar and tracks the active
//! one, and a [`CompatibilityAdjuster`] shifts weekdays for external systems
//! that count differently.
//!
//! Nothing here panics on bad input. Raw month/day arguments are clamped and
//! the problem is reported alongside the value through [`Clamped`].

mod consts;
mod prelude;

pub mod compat;
pub mod date;
pub mod engine;
pub mod error;
pub mod registry;
pub mod types;
pub mod variant;

#[cfg(test)]
mod test_utils;

pub use compat::CompatibilityAdjuster;
pub use consts::*;
pub use date::{CalendarDate, TimeOfDay, WorldTime};
pub use engine::CalendarEngine;
pub use error::{CalendarError, Clamped, DefinitionError, VariantError};
pub use registry::CalendarRegistry;
pub use types::{
    CalendarDefinition, CalendarMonth, CalendarVariant, CalendarWeekday, DateFormat, DateFormats,
    IntercalaryDay, LeapYearRule, MonthRef, Moon, MoonEpoch, MoonPhase, Season, TimeConfig,
    VariantConfig, YearConfig,
};
pub use variant::{
    ExternalVariantSet, VariantOverrides, resolve_variant, split_variant_id, variant_id,
};
