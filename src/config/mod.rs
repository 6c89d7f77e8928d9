//! BlendIQ Configuration Module
//!
//! Provides solver tuning, reference tables and server settings loaded from
//! TOML files.
//!
//! ## Loading Order
//!
//! 1. `BLENDIQ_CONFIG` environment variable (path to TOML file)
//! 2. `blendiq.toml` in the current working directory
//! 3. Built-in defaults (BS3882 reference tables, standard solver constants)
//!
//! ## Usage
//!
//! The loaded config is passed by value into the optimizer and the API state;
//! there is no process-wide instance, so tests can run side by side with
//! different reference tables.
//!
//! ```ignore
//! let config = BlendiqConfig::load();
//! let optimizer = BlendOptimizer::new(config.reference.clone(), config.solver.clone());
//! ```

mod blendiq_config;
pub mod defaults;
pub mod reference;
pub mod validation;

pub use blendiq_config::*;
pub use reference::ReferenceData;
