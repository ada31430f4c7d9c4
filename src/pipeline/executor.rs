//! Ordered stage list and its runner.
//!
//! Stages run in insertion order over every array. Stage names are unique
//! within one pipeline.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::stage::{AnyStage, BuiltinStage};
use crate::types::{Part, PartList};
use ndarray::Array2;

#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<AnyStage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline of built-in stages from their names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> PipelineResult<Self> {
        let mut pipeline = Self::new();
        for name in names {
            pipeline.add_stage(BuiltinStage::from_name(name.as_ref())?)?;
        }
        Ok(pipeline)
    }

    /// Append a stage. Names must be unique.
    pub fn add_stage(&mut self, stage: impl Into<AnyStage>) -> PipelineResult<()> {
        let stage = stage.into();
        if self.has_stage(stage.name()) {
            return Err(PipelineError::DuplicateStage(stage.name().to_string()));
        }
        tracing::debug!("Pipeline stage added: {}", stage.name());
        self.stages.push(stage);
        Ok(())
    }

    /// Remove a stage by name and return it.
    pub fn remove_stage(&mut self, name: &str) -> PipelineResult<AnyStage> {
        let pos = self
            .stages
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| PipelineError::MissingStage(name.to_string()))?;
        tracing::debug!("Pipeline stage removed: {}", name);
        Ok(self.stages.remove(pos))
    }

    pub fn has_stage(&self, name: &str) -> bool {
        self.stages.iter().any(|s| s.name() == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(AnyStage::name).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over copies of the input arrays.
    pub fn apply(&self, arrays: &[Array2<f32>]) -> Vec<Array2<f32>> {
        arrays
            .iter()
            .map(|a| {
                let mut out = a.clone();
                self.apply_in_place(&mut out);
                out
            })
            .collect()
    }

    pub fn apply_in_place(&self, samples: &mut Array2<f32>) {
        for stage in &self.stages {
            stage.apply(samples);
        }
    }

    /// Transform the samples of each part; ids, timing and empty slots are kept.
    pub fn apply_parts(&self, parts: &[Option<Part>]) -> PartList {
        parts
            .iter()
            .map(|slot| {
                slot.as_ref().map(|part| {
                    let mut out = part.clone();
                    self.apply_in_place(&mut out.samples);
                    out
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::StagePlugin;
    use crate::pipeline::stages::{Rebaseline, UnitNorm};
    use crate::types::TickInfo;
    use ndarray::array;

    struct Negate;

    impl StagePlugin for Negate {
        fn name(&self) -> &str {
            "Negate"
        }

        fn apply(&self, samples: &mut Array2<f32>) {
            samples.mapv_inplace(|v| -v);
        }
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let input = vec![array![[1.0f32, 2.0]]];
        assert_eq!(Pipeline::new().apply(&input), input);
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(BuiltinStage::Rebaseline(Rebaseline)).unwrap();
        pipeline.add_stage(BuiltinStage::UnitNorm(UnitNorm)).unwrap();
        let out = pipeline.apply(&[array![[1.0f32, 2.0, 5.0]]]);
        // rebaseline -> [-1, 0, 3], unit norm -> [0, 0.25, 1]
        assert_eq!(out[0], array![[0.0, 0.25, 1.0]]);
    }

    #[test]
    fn test_membership_by_name() {
        let mut pipeline = Pipeline::from_names(&["rebaseline"]).unwrap();
        assert!(pipeline.has_stage("Rebaseline"));
        assert_eq!(
            pipeline.add_stage(BuiltinStage::Rebaseline(Rebaseline)),
            Err(PipelineError::DuplicateStage("Rebaseline".to_string()))
        );
        pipeline.add_stage(Box::new(Negate) as Box<dyn StagePlugin>).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["Rebaseline", "Negate"]);
        assert!(pipeline.remove_stage("Rebaseline").is_ok());
        assert!(matches!(
            pipeline.remove_stage("Rebaseline"),
            Err(PipelineError::MissingStage(_))
        ));
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_apply_parts_keeps_empty_slots() {
        let pipeline = Pipeline::from_names(&["unitnorm"]).unwrap();
        let part = Part::with_sequential_channels(array![[0.0f32, 4.0]], TickInfo::unit(2));
        let out = pipeline.apply_parts(&[None, Some(part.clone())]);
        assert!(out[0].is_none());
        let transformed = out[1].as_ref().unwrap();
        assert_eq!(transformed.samples, array![[0.0, 1.0]]);
        assert_eq!(transformed.channel_ids, part.channel_ids);
    }
}
