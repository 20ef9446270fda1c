//! Configuration module for harvest runs
//!
//! This module provides the `HarvestConfig` struct, its type-safe builder,
//! the selector tables and the JSON config file overlay.

// Sub-modules
pub mod builder;
pub mod file;
pub mod getters;
pub mod methods;
pub mod selectors;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, HarvestConfigBuilder, WithBaseUrl};
pub use file::ConfigFile;
pub use methods::Timeouts;
pub use selectors::{RegionSelectors, SelectorTable};
pub use types::{HarvestConfig, NavigationMode, RenderFormat};
