//! Blend Optimization Engine
//!
//! Finds mixing ratios for source materials so the blended product meets
//! regulatory parameter limits with a safety margin. Data flows strictly
//! forward: normalizer → objective ⇄ solver → assembler. No stage keeps state
//! between runs.

pub mod assembler;
pub mod normalizer;
pub mod objective;
mod optimizer;
pub mod projection;
pub mod solver;

pub use optimizer::{optimize, BlendOptimizer};
