//! Built-in stage implementations.

pub mod rebaseline;
pub mod unit_norm;

pub use rebaseline::Rebaseline;
pub use unit_norm::UnitNorm;
