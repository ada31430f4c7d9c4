//! Stage abstraction for the transform pipeline.
//!
//! Two-layer design:
//! - **`StagePlugin` trait**: for stages supplied from outside the crate.
//! - **`BuiltinStage` enum**: for the built-in stages, dispatched by `match`.
//!
//! `AnyStage` wraps either variant so the pipeline can handle both uniformly.
//! Every stage is stateless and maps one array to an array of the same shape.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::stages::{Rebaseline, UnitNorm};
use ndarray::Array2;

/// Trait for externally supplied stages.
pub trait StagePlugin: Send {
    /// Name used for add/remove/membership queries.
    fn name(&self) -> &str;

    /// Transform one array in place.
    fn apply(&self, samples: &mut Array2<f32>);
}

/// Enum dispatch for built-in stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinStage {
    Rebaseline(Rebaseline),
    UnitNorm(UnitNorm),
}

impl BuiltinStage {
    pub fn name(&self) -> &str {
        match self {
            BuiltinStage::Rebaseline(s) => s.name(),
            BuiltinStage::UnitNorm(s) => s.name(),
        }
    }

    pub fn apply(&self, samples: &mut Array2<f32>) {
        match self {
            BuiltinStage::Rebaseline(s) => s.apply(samples),
            BuiltinStage::UnitNorm(s) => s.apply(samples),
        }
    }

    /// Look up a built-in stage by name, ignoring case.
    pub fn from_name(name: &str) -> PipelineResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rebaseline" => Ok(BuiltinStage::Rebaseline(Rebaseline)),
            "unitnorm" | "unit_norm" => Ok(BuiltinStage::UnitNorm(UnitNorm)),
            _ => Err(PipelineError::UnknownStage(name.to_string())),
        }
    }
}

/// Wrapper that holds either a built-in or an external stage.
pub enum AnyStage {
    Builtin(BuiltinStage),
    Plugin(Box<dyn StagePlugin>),
}

impl std::fmt::Debug for AnyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnyStage").field(&self.name()).finish()
    }
}

impl AnyStage {
    pub fn name(&self) -> &str {
        match self {
            AnyStage::Builtin(s) => s.name(),
            AnyStage::Plugin(s) => s.name(),
        }
    }

    pub fn apply(&self, samples: &mut Array2<f32>) {
        match self {
            AnyStage::Builtin(s) => s.apply(samples),
            AnyStage::Plugin(s) => s.apply(samples),
        }
    }
}

impl From<BuiltinStage> for AnyStage {
    fn from(stage: BuiltinStage) -> Self {
        AnyStage::Builtin(stage)
    }
}

impl From<Box<dyn StagePlugin>> for AnyStage {
    fn from(stage: Box<dyn StagePlugin>) -> Self {
        AnyStage::Plugin(stage)
    }
}
