//! BlendIQ: Blend-Ratio Optimization for Soil and Compost
//!
//! Finds mixing ratios for a set of source materials so the blended product
//! satisfies regulatory parameter limits (BS3882 topsoil by default) with a
//! configurable safety margin.
//!
//! ## Architecture
//!
//! - **Types**: materials, per-run blend config, result contracts
//! - **Config**: solver tuning, reference tables and server settings from TOML
//! - **Optimization Engine**: normalizer → objective ⇄ projected-gradient
//!   search → result assembly, as a pure function of its inputs
//! - **API**: axum HTTP boundary with request validation

pub mod api;
pub mod config;
pub mod optimization;
pub mod types;

// Re-export service configuration
pub use config::{BlendiqConfig, ReferenceData, SolverSettings};

// Re-export the engine entry points
pub use optimization::{optimize, BlendOptimizer};

// Re-export commonly used types
pub use types::{
    BlendConfig, ComplianceStatus, Limit, Material, MaterialConstraint, OptimizationResult,
    ParameterCategory,
};
