//! Shared data structures for blend optimization
//!
//! This module defines the data contracts between the engine and its callers:
//! - Inputs: [`Material`] lab readings and the per-run [`BlendConfig`]
//! - Reference metadata: [`Limit`] pairs and [`ParameterCategory`]
//! - Output: [`OptimizationResult`] with tonnage, residuals and compliance
//!
//! All types serialize as camelCase JSON so they match the upload/report
//! layer's wire format.

mod blend;
mod material;
mod optimization;
mod parameter;

pub use blend::*;
pub use material::*;
pub use optimization::*;
pub use parameter::*;
