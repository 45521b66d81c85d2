//! Variant overlays.
//!
//! A variant derives a new calendar from a base one. The derived definition is
//! an independent copy with id `base(variant)`; the base is never touched.
//!
//! Merge rules, applied field by field:
//!
//! | Overlay field  | Rule |
//! |----------------|------|
//! | `year`         | present keys replace the base's keys |
//! | `months`       | keyed by current month name, present keys replace; unknown names ignored |
//! |                | a renamed month keeps its intercalary and leap-month references |
//! | `weekdays`     | same as `months` |
//! | `dateFormats`  | top-level keys replace; `widgets` merges key by key |
//! | `moons`        | when present (even `null` or `[]`) replaces the whole list |
//!
//! `config.yearOffset` is applied last, on top of the merged `year`.

use crate::consts::{VARIANT_CLOSE, VARIANT_OPEN};
use crate::error::VariantError;
use crate::types::{
    CalendarDefinition, CalendarMonth, CalendarVariant, CalendarWeekday, DateFormats, Moon,
    MonthRef, YearConfig, is_valid_variant_id,
};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Partial overlay applied to a base calendar.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOverrides {
    #[serde(default)]
    pub year: YearOverride,
    /// Keyed by the base's month name.
    #[serde(default)]
    pub months: BTreeMap<String, MonthOverride>,
    /// Keyed by the base's weekday name.
    #[serde(default)]
    pub weekdays: BTreeMap<String, WeekdayOverride>,
    #[serde(default)]
    pub date_formats: DateFormats,
    /// Outer `None`: key absent. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub moons: Option<Option<Vec<Moon>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearOverride {
    pub epoch: Option<i32>,
    pub current_year: Option<i32>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub start_day: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonthOverride {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub days: Option<u32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WeekdayOverride {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub description: Option<String>,
}

/// A separately loaded file of variants for one base calendar.
///
/// Variants from such a set are only reachable by explicit id; a `default`
/// flag inside one is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalVariantSet {
    pub base_calendar: String,
    #[serde(default)]
    pub variants: BTreeMap<String, CalendarVariant>,
}

/// Maps a field that is present (even as `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl VariantOverrides {
    /// Reads an untyped overrides object. `null` means no overrides.
    ///
    /// # Errors
    /// Returns [`VariantError::MalformedOverrides`] when a field has the wrong
    /// shape.
    pub fn from_value(variant: &str, value: serde_json::Value) -> Result<Self, VariantError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| VariantError::MalformedOverrides {
            variant: variant.to_owned(),
            reason: e.to_string(),
        })
    }
}

impl YearOverride {
    fn apply(&self, year: &mut YearConfig) {
        if let Some(epoch) = self.epoch {
            year.epoch = epoch;
        }
        if let Some(current_year) = self.current_year {
            year.current_year = current_year;
        }
        if let Some(prefix) = &self.prefix {
            year.prefix.clone_from(prefix);
        }
        if let Some(suffix) = &self.suffix {
            year.suffix.clone_from(suffix);
        }
        if let Some(start_day) = self.start_day {
            year.start_day = start_day;
        }
    }
}

impl MonthOverride {
    fn apply(&self, month: &mut CalendarMonth) {
        if let Some(name) = &self.name {
            month.name.clone_from(name);
        }
        if let Some(abbreviation) = &self.abbreviation {
            month.abbreviation = Some(abbreviation.clone());
        }
        if let Some(days) = self.days {
            month.days = days;
        }
        if let Some(description) = &self.description {
            month.description = Some(description.clone());
        }
    }
}

impl WeekdayOverride {
    fn apply(&self, weekday: &mut CalendarWeekday) {
        if let Some(name) = &self.name {
            weekday.name.clone_from(name);
        }
        if let Some(abbreviation) = &self.abbreviation {
            weekday.abbreviation = Some(abbreviation.clone());
        }
        if let Some(description) = &self.description {
            weekday.description = Some(description.clone());
        }
    }
}

/// `base(variant)`
pub fn variant_id(base: &str, variant: &str) -> String {
    format!("{base}{VARIANT_OPEN}{variant}{VARIANT_CLOSE}")
}

/// Splits `base(variant)` into its parts. Plain ids yield `None`.
pub fn split_variant_id(id: &str) -> Option<(&str, &str)> {
    let (base, variant) = id.strip_suffix(VARIANT_CLOSE)?.rsplit_once(VARIANT_OPEN)?;
    (!base.is_empty() && !variant.is_empty()).then_some((base, variant))
}

/// Builds the derived definition for variant `id` of `base`.
///
/// The result owns all of its data and carries no variants of its own.
pub fn resolve_variant(
    base: &CalendarDefinition,
    id: &str,
    overrides: &VariantOverrides,
) -> CalendarDefinition {
    let mut derived = base.clone();
    derived.id = variant_id(&base.id, id);
    derived.variants.clear();

    overrides.year.apply(&mut derived.year);

    let mut renamed = BTreeMap::new();
    for month in &mut derived.months {
        if let Some(patch) = overrides.months.get(&month.name) {
            let old = month.name.clone();
            patch.apply(month);
            if month.name != old {
                renamed.insert(old, month.name.clone());
            }
        }
    }
    if !renamed.is_empty() {
        let references = derived
            .intercalary_days
            .iter_mut()
            .map(|day| &mut day.after_month)
            .chain(derived.leap_year.month_mut());
        for reference in references {
            if let MonthRef::Name(name) = reference {
                if let Some(new) = renamed.get(name.as_str()) {
                    name.clone_from(new);
                }
            }
        }
    }
    for weekday in &mut derived.weekdays {
        if let Some(patch) = overrides.weekdays.get(&weekday.name) {
            patch.apply(weekday);
        }
    }

    derived
        .date_formats
        .formats
        .extend(overrides.date_formats.formats.clone());
    derived
        .date_formats
        .widgets
        .extend(overrides.date_formats.widgets.clone());

    if let Some(moons) = &overrides.moons {
        derived.moons = moons.clone().unwrap_or_default();
    }

    debug!(
        base = %base.id,
        calendar = %derived.id,
        months = overrides.months.len(),
        weekdays = overrides.weekdays.len(),
        "variant resolved"
    );
    derived
}

/// Resolves a declared variant: checks its id, reads its overrides, merges,
/// then applies `config.yearOffset`.
///
/// # Errors
/// Returns [`VariantError::InvalidId`], [`VariantError::MalformedOverrides`]
/// or [`VariantError::InvalidDefinition`] when the merged calendar does not
/// validate; the base is left unchanged either way.
pub fn resolve_declared_variant(
    base: &CalendarDefinition,
    id: &str,
    variant: &CalendarVariant,
) -> Result<CalendarDefinition, VariantError> {
    if !is_valid_variant_id(id) {
        return Err(VariantError::InvalidId {
            variant: id.to_owned(),
        });
    }
    let overrides = VariantOverrides::from_value(id, variant.overrides.clone())?;
    let mut derived = resolve_variant(base, id, &overrides);

    if let Some(offset) = variant.config.year_offset {
        derived.year.epoch = derived.year.epoch.saturating_add(offset);
        derived.year.current_year = derived.year.current_year.saturating_add(offset);
    }
    derived.name = Some(variant.name.clone());
    if variant.description.is_some() {
        derived.description.clone_from(&variant.description);
    }
    derived
        .validate()
        .map_err(|errors| VariantError::InvalidDefinition {
            variant: id.to_owned(),
            errors,
        })?;
    Ok(derived)
}

/// The inline variant marked `default`, if any.
///
/// When several are marked the lowest id wins and a warning is logged.
pub fn default_variant(base: &CalendarDefinition) -> Option<&str> {
    let mut defaults = base
        .variants
        .iter()
        .filter(|(_, v)| v.default)
        .map(|(id, _)| id.as_str());
    let chosen = defaults.next()?;
    let extra: Vec<&str> = defaults.collect();
    if !extra.is_empty() {
        warn!(calendar = %base.id, chosen, ignored = ?extra, "several default variants");
    }
    Some(chosen)
}
