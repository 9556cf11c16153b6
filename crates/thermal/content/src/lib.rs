//! Data-driven temperature content and loaders.
//!
//! This crate houses static temperature content and provides loaders for
//! RON/TOML data files:
//! - Temperature configuration (data-driven via TOML)
//! - Environmental sample tables (data-driven via RON)
//! - Per-entity attribute tables (data-driven via RON)
//!
//! Content is consumed by runtime oracles and never appears in temperature state.

pub mod attributes;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use attributes::{AttributeEntry, AttributeTable};

#[cfg(feature = "loaders")]
pub use loaders::{AttributeLoader, ConfigLoader, ContentFactory, SampleTableLoader};
