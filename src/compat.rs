//! Per-system output offsets.
//!
//! Some host systems number weekdays (or format dates) one or two steps away
//! from the calendar's own counting. They register a flat offset per
//! `(system, calendar)` pair here, and consumers that speak to that system
//! pass raw engine output through [`CompatibilityAdjuster::adjust_weekday`].
//! Engines and definitions never see these offsets.

use std::collections::HashMap;
use tracing::debug;

type OffsetTable = HashMap<String, HashMap<String, i64>>;

/// Offsets keyed by system id, then calendar id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityAdjuster {
    weekday_offsets: OffsetTable,
    format_offsets: OffsetTable,
}

impl CompatibilityAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a weekday offset, returning the one it replaced.
    pub fn register_offset(
        &mut self,
        system_id: &str,
        calendar_id: &str,
        offset: i64,
    ) -> Option<i64> {
        debug!(system = system_id, calendar = calendar_id, offset, "weekday offset registered");
        insert(&mut self.weekday_offsets, system_id, calendar_id, offset)
    }

    pub fn weekday_offset(&self, system_id: &str, calendar_id: &str) -> Option<i64> {
        lookup(&self.weekday_offsets, system_id, calendar_id)
    }

    /// Shifts a raw weekday for `system_id`, wrapping into `0..weekdays`.
    ///
    /// Without a registered offset `raw` is returned as is.
    pub fn adjust_weekday(
        &self,
        raw: u32,
        calendar_id: &str,
        system_id: &str,
        weekdays: u32,
    ) -> u32 {
        let Some(offset) = self.weekday_offset(system_id, calendar_id) else {
            return raw;
        };
        let wrapped = i64::from(raw)
            .saturating_add(offset)
            .rem_euclid(i64::from(weekdays.max(1)));
        u32::try_from(wrapped).unwrap_or(0)
    }

    /// Registers a date-formatting offset, returning the one it replaced.
    pub fn register_format_offset(
        &mut self,
        system_id: &str,
        calendar_id: &str,
        offset: i64,
    ) -> Option<i64> {
        debug!(system = system_id, calendar = calendar_id, offset, "format offset registered");
        insert(&mut self.format_offsets, system_id, calendar_id, offset)
    }

    /// Formatting offset for the pair, `0` when none is registered.
    pub fn format_offset(&self, system_id: &str, calendar_id: &str) -> i64 {
        lookup(&self.format_offsets, system_id, calendar_id).unwrap_or(0)
    }

    /// Drops every offset registered for `system_id`.
    pub fn clear_system(&mut self, system_id: &str) {
        let weekday = self.weekday_offsets.remove(system_id).map_or(0, |t| t.len());
        let format = self.format_offsets.remove(system_id).map_or(0, |t| t.len());
        debug!(system = system_id, weekday, format, "offsets cleared");
    }
}

fn insert(table: &mut OffsetTable, system_id: &str, calendar_id: &str, offset: i64) -> Option<i64> {
    table
        .entry(system_id.to_owned())
        .or_default()
        .insert(calendar_id.to_owned(), offset)
}

fn lookup(table: &OffsetTable, system_id: &str, calendar_id: &str) -> Option<i64> {
    table.get(system_id)?.get(calendar_id).copied()
}
