//! Prelude module for world_calendar crate.
//!
//! Re-exports the derive_more derives used by the value types.

pub use derive_more::{Display, From, Into};
