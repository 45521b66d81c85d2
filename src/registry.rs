//! Keyed collection of calendars, one engine each, plus the active selection.
//!
//! Registering a definition also registers each of its inline variants as
//! `base(variant)`. Variants from an [`ExternalVariantSet`] are registered the
//! same way but never become a base's default.

use crate::compat::CompatibilityAdjuster;
use crate::date::{CalendarDate, WorldTime};
use crate::engine::CalendarEngine;
use crate::error::{CalendarError, VariantError};
use crate::types::CalendarDefinition;
use crate::variant::{
    ExternalVariantSet, default_variant, resolve_declared_variant, split_variant_id, variant_id,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct CalendarRegistry {
    engines: BTreeMap<String, CalendarEngine>,
    /// Base id to the full id of its inline default variant.
    defaults: BTreeMap<String, String>,
    active: Option<String>,
    compat: CompatibilityAdjuster,
}

impl CalendarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `definition` and its inline variants, replacing any calendar
    /// with the same id along with every variant derived from it. Variants
    /// that fail to resolve are skipped and returned.
    pub fn register(&mut self, definition: CalendarDefinition) -> Vec<VariantError> {
        let base_id = definition.id.clone();
        let mut skipped = Vec::new();

        let before = self.engines.len();
        self.engines
            .retain(|id, _| split_variant_id(id).is_none_or(|(base, _)| base != base_id));
        if self.engines.len() < before {
            let dropped = before - self.engines.len();
            debug!(calendar = %base_id, dropped, "stale variants dropped");
        }

        for (id, variant) in &definition.variants {
            match resolve_declared_variant(&definition, id, variant) {
                Ok(derived) => self.insert(derived),
                Err(error) => {
                    warn!(calendar = %base_id, variant = %id, %error, "variant skipped");
                    skipped.push(error);
                }
            }
        }

        self.defaults.remove(&base_id);
        if let Some(id) = default_variant(&definition) {
            let full_id = variant_id(&base_id, id);
            if self.engines.contains_key(&full_id) {
                self.defaults.insert(base_id.clone(), full_id);
            }
        }

        self.insert(definition);
        skipped
    }

    /// Registers every variant of an externally loaded set against its base.
    pub fn register_external_variants(&mut self, set: &ExternalVariantSet) -> Vec<VariantError> {
        let Some(base) = self
            .engines
            .get(&set.base_calendar)
            .map(CalendarEngine::shared_definition)
        else {
            return set
                .variants
                .keys()
                .map(|id| {
                    let error = VariantError::UnknownBase {
                        base: set.base_calendar.clone(),
                        variant: id.clone(),
                    };
                    warn!(%error, "external variant skipped");
                    error
                })
                .collect();
        };

        let mut skipped = Vec::new();
        for (id, variant) in &set.variants {
            if variant.default {
                debug!(
                    base = %base.id,
                    variant = %id,
                    "external variant marked default; only reachable by id"
                );
            }
            match resolve_declared_variant(&base, id, variant) {
                Ok(derived) => self.insert(derived),
                Err(error) => {
                    warn!(base = %base.id, variant = %id, %error, "external variant skipped");
                    skipped.push(error);
                }
            }
        }
        skipped
    }

    fn insert(&mut self, definition: CalendarDefinition) {
        let engine = CalendarEngine::from_definition(definition);
        debug!(calendar = %engine.id(), "calendar registered");
        self.engines.insert(engine.id().to_owned(), engine);
    }

    pub fn engine(&self, id: &str) -> Option<&CalendarEngine> {
        self.engines.get(id)
    }

    pub fn definition(&self, id: &str) -> Option<&CalendarDefinition> {
        self.engine(id).map(CalendarEngine::definition)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.engines.contains_key(id)
    }

    /// Registered ids in sorted order, variants included.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// The derived definition for `base(variant)`.
    ///
    /// # Errors
    /// [`VariantError::UnknownBase`] when `base_id` is not registered,
    /// [`VariantError::UnknownVariant`] when the variant is not.
    pub fn resolve_variant(
        &self,
        base_id: &str,
        variant: &str,
    ) -> Result<Arc<CalendarDefinition>, VariantError> {
        if !self.contains(base_id) {
            return Err(VariantError::UnknownBase {
                base: base_id.to_owned(),
                variant: variant.to_owned(),
            });
        }
        self.engine(&variant_id(base_id, variant))
            .map(CalendarEngine::shared_definition)
            .ok_or_else(|| VariantError::UnknownVariant {
                base: base_id.to_owned(),
                variant: variant.to_owned(),
            })
    }

    /// Full id of the inline default variant of `base_id`.
    pub fn resolve_default_variant(&self, base_id: &str) -> Option<&str> {
        self.defaults.get(base_id).map(String::as_str)
    }

    /// The id an operation on `requested` should use: a base with an inline
    /// default redirects to that variant, any other registered id is used as
    /// is.
    pub fn resolve_calendar_id<'a>(&'a self, requested: &'a str) -> Option<&'a str> {
        if let Some(default) = self.resolve_default_variant(requested) {
            return Some(default);
        }
        self.contains(requested).then_some(requested)
    }

    /// Selects the active calendar, returning the id actually selected.
    ///
    /// # Errors
    /// Returns [`CalendarError::UnknownCalendar`] for unregistered ids.
    pub fn set_active(&mut self, id: &str) -> Result<&str, CalendarError> {
        let resolved = self
            .resolve_calendar_id(id)
            .ok_or_else(|| CalendarError::UnknownCalendar { id: id.to_owned() })?
            .to_owned();
        debug!(requested = id, calendar = %resolved, "active calendar set");
        Ok(self.active.insert(resolved).as_str())
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// # Errors
    /// Returns [`CalendarError::NoActiveCalendar`] before [`Self::set_active`].
    pub fn active_engine(&self) -> Result<&CalendarEngine, CalendarError> {
        let id = self.active.as_deref().ok_or(CalendarError::NoActiveCalendar)?;
        self.engine(id)
            .ok_or_else(|| CalendarError::UnknownCalendar { id: id.to_owned() })
    }

    /// # Errors
    /// Fails when no calendar is active.
    pub fn active_world_time_to_date(
        &self,
        time: WorldTime,
        world_creation_offset: i64,
    ) -> Result<CalendarDate, CalendarError> {
        Ok(self.active_engine()?.world_time_to_date(time, world_creation_offset))
    }

    /// # Errors
    /// Fails when no calendar is active.
    pub fn active_date_to_world_time(
        &self,
        date: &CalendarDate,
        world_creation_offset: i64,
    ) -> Result<WorldTime, CalendarError> {
        Ok(self.active_engine()?.date_to_world_time(date, world_creation_offset))
    }

    pub fn compat(&self) -> &CompatibilityAdjuster {
        &self.compat
    }

    pub fn compat_mut(&mut self) -> &mut CompatibilityAdjuster {
        &mut self.compat
    }

    /// Applies `system_id`'s weekday offset for `calendar_id`, using that
    /// calendar's week length.
    ///
    /// # Errors
    /// Returns [`CalendarError::UnknownCalendar`] for unregistered ids.
    pub fn adjust_weekday(
        &self,
        raw: u32,
        calendar_id: &str,
        system_id: &str,
    ) -> Result<u32, CalendarError> {
        let engine = self.engine(calendar_id).ok_or_else(|| CalendarError::UnknownCalendar {
            id: calendar_id.to_owned(),
        })?;
        Ok(self
            .compat
            .adjust_weekday(raw, calendar_id, system_id, engine.weekday_count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{festival, gregorian};
    use crate::types::{CalendarVariant, VariantConfig};
    use serde_json::json;

    fn variant(default: bool, overrides: serde_json::Value) -> CalendarVariant {
        CalendarVariant {
            name: "Variant".to_owned(),
            description: None,
            default,
            config: VariantConfig::default(),
            overrides,
        }
    }

    #[test]
    fn test_register_adds_inline_variants() {
        let mut base = gregorian();
        base.variants.insert(
            "ar".to_owned(),
            variant(false, json!({ "year": { "suffix": " AR" } })),
        );
        let mut registry = CalendarRegistry::new();

        assert!(registry.register(base).is_empty());
        assert_eq!(registry.ids().collect::<Vec<_>>(), ["gregorian", "gregorian(ar)"]);
        assert_eq!(
            registry.definition("gregorian(ar)").map(|d| d.year.suffix.as_str()),
            Some(" AR")
        );
        assert_eq!(registry.definition("gregorian").map(|d| d.year.suffix.as_str()), Some(""));
    }

    #[test]
    fn test_reregistering_drops_stale_variants() {
        let mut base = gregorian();
        base.variants.insert("old".to_owned(), variant(true, json!({})));
        let mut registry = CalendarRegistry::new();
        let _ = registry.register(base);
        let set = ExternalVariantSet {
            base_calendar: "gregorian".to_owned(),
            variants: [("themed".to_owned(), variant(false, json!({})))].into(),
        };
        let _ = registry.register_external_variants(&set);
        let _ = registry.register(festival());
        assert_eq!(registry.len(), 4);

        let mut base = gregorian();
        base.variants.insert("new".to_owned(), variant(false, json!({})));
        assert!(registry.register(base).is_empty());

        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            ["festival", "gregorian", "gregorian(new)"]
        );
        assert_eq!(registry.resolve_default_variant("gregorian"), None);
    }

    #[test]
    fn test_variant_renaming_leap_month_keeps_year_length() {
        let mut base = gregorian();
        base.variants.insert(
            "latin".to_owned(),
            variant(false, json!({ "months": { "February": { "name": "Februarius" } } })),
        );
        let mut registry = CalendarRegistry::new();
        assert!(registry.register(base).is_empty());

        let base = registry.engine("gregorian").expect("base registered");
        let latin = registry.engine("gregorian(latin)").expect("variant registered");
        assert_eq!(latin.month_name(2), Some("Februarius"));
        assert_eq!(latin.year_length(2024), base.year_length(2024));
        assert_eq!(latin.month_length(2, 2024).into_value(), 29);
    }

    #[test]
    fn test_variant_producing_invalid_calendar_is_skipped() {
        let mut base = gregorian();
        base.variants
            .insert("odd".to_owned(), variant(false, json!({ "year": { "startDay": 7 } })));
        let mut registry = CalendarRegistry::new();

        let skipped = registry.register(base);
        assert!(matches!(
            &skipped[..],
            [VariantError::InvalidDefinition { variant, .. }] if variant == "odd"
        ));
        assert!(!registry.contains("gregorian(odd)"));
    }

    #[test]
    fn test_malformed_variant_is_skipped_alone() {
        let mut base = gregorian();
        base.variants.insert("bad".to_owned(), variant(false, json!({ "months": 3 })));
        base.variants.insert("good".to_owned(), variant(false, json!({})));
        let mut registry = CalendarRegistry::new();

        let skipped = registry.register(base);
        assert_eq!(skipped.len(), 1);
        assert!(matches!(skipped[0], VariantError::MalformedOverrides { .. }));
        assert!(registry.contains("gregorian"));
        assert!(registry.contains("gregorian(good)"));
        assert!(!registry.contains("gregorian(bad)"));
    }

    #[test]
    fn test_inline_default_is_resolved() {
        let mut base = gregorian();
        base.variants.insert("plain".to_owned(), variant(false, json!({})));
        base.variants.insert("main".to_owned(), variant(true, json!({})));
        let mut registry = CalendarRegistry::new();
        let _ = registry.register(base);

        assert_eq!(registry.resolve_default_variant("gregorian"), Some("gregorian(main)"));
        assert_eq!(registry.resolve_calendar_id("gregorian"), Some("gregorian(main)"));
        assert_eq!(registry.resolve_calendar_id("gregorian(plain)"), Some("gregorian(plain)"));
        assert_eq!(registry.resolve_calendar_id("nope"), None);
    }

    #[test]
    fn test_external_default_is_never_selected() {
        let mut registry = CalendarRegistry::new();
        let _ = registry.register(gregorian());
        let set = ExternalVariantSet {
            base_calendar: "gregorian".to_owned(),
            variants: [("themed".to_owned(), variant(true, json!({})))].into(),
        };

        assert!(registry.register_external_variants(&set).is_empty());
        assert_eq!(registry.resolve_default_variant("gregorian"), None);
        assert_eq!(registry.resolve_calendar_id("gregorian"), Some("gregorian"));
        assert!(registry.resolve_variant("gregorian", "themed").is_ok());
    }

    #[test]
    fn test_external_set_with_unknown_base() {
        let mut registry = CalendarRegistry::new();
        let set = ExternalVariantSet {
            base_calendar: "golarion".to_owned(),
            variants: [("absalom".to_owned(), variant(false, json!({})))].into(),
        };
        let skipped = registry.register_external_variants(&set);
        assert_eq!(
            skipped,
            vec![VariantError::UnknownBase {
                base: "golarion".to_owned(),
                variant: "absalom".to_owned()
            }]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_variant_errors() {
        let mut registry = CalendarRegistry::new();
        let _ = registry.register(gregorian());
        assert!(matches!(
            registry.resolve_variant("harptos", "x"),
            Err(VariantError::UnknownBase { .. })
        ));
        assert!(matches!(
            registry.resolve_variant("gregorian", "x"),
            Err(VariantError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_active_calendar_routing() {
        let mut registry = CalendarRegistry::new();
        let _ = registry.register(gregorian());
        let _ = registry.register(festival());

        assert_eq!(registry.active_engine().err(), Some(CalendarError::NoActiveCalendar));
        assert_eq!(
            registry.set_active("nope"),
            Err(CalendarError::UnknownCalendar { id: "nope".to_owned() })
        );

        assert_eq!(registry.set_active("festival"), Ok("festival"));
        let date = registry
            .active_world_time_to_date(WorldTime::ZERO, 0)
            .expect("calendar is active");
        assert_eq!(date.ymd(), (1, 1, 1));
        assert_eq!(registry.active_date_to_world_time(&date, 10), Ok(WorldTime::new(10)));

        let _ = registry.set_active("gregorian");
        assert_eq!(registry.active_id(), Some("gregorian"));
        let date = registry
            .active_world_time_to_date(WorldTime::ZERO, 0)
            .expect("calendar is active");
        assert_eq!(date.ymd(), (1970, 1, 1));
    }

    #[test]
    fn test_adjust_weekday_uses_calendar_week() {
        let mut registry = CalendarRegistry::new();
        let _ = registry.register(festival());
        registry.compat_mut().register_offset("pf2e", "festival", -3);

        assert_eq!(registry.adjust_weekday(1, "festival", "pf2e"), Ok(8));
        assert_eq!(registry.adjust_weekday(1, "festival", "other"), Ok(1));
        assert!(registry.adjust_weekday(1, "nope", "pf2e").is_err());
        assert_eq!(registry.compat().weekday_offset("pf2e", "festival"), Some(-3));
    }
}
