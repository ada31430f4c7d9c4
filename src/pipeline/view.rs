//! Per-slot pipeline state.
//!
//! A view keeps the untransformed parts it was last given next to the
//! transformed output. Any input change or stage edit reruns the whole
//! pipeline from the untransformed parts.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::executor::Pipeline;
use crate::pipeline::stage::AnyStage;
use crate::types::{Part, PartList};

#[derive(Debug, Default)]
pub struct SlotView {
    pipeline: Pipeline,
    original: PartList,
    output: PartList,
    runs: u64,
}

impl SlotView {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            ..Self::default()
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Replace the input and rerun.
    pub fn set_parts(&mut self, parts: PartList) {
        self.original = parts;
        self.rerun();
    }

    /// Replace the input from borrowed parts and rerun.
    pub fn set_parts_from(&mut self, parts: &[Option<&Part>]) {
        self.set_parts(parts.iter().map(|p| p.cloned()).collect());
    }

    pub fn add_stage(&mut self, stage: impl Into<AnyStage>) -> PipelineResult<()> {
        self.pipeline.add_stage(stage)?;
        self.rerun();
        Ok(())
    }

    pub fn remove_stage(&mut self, name: &str) -> PipelineResult<AnyStage> {
        let stage = self.pipeline.remove_stage(name)?;
        self.rerun();
        Ok(stage)
    }

    /// Add the stage if absent, remove it if present.
    pub fn toggle_stage(&mut self, stage: impl Into<AnyStage>) -> PipelineResult<bool> {
        let stage = stage.into();
        if self.pipeline.has_stage(stage.name()) {
            let name = stage.name().to_string();
            self.remove_stage(&name)?;
            Ok(false)
        } else {
            self.add_stage(stage)?;
            Ok(true)
        }
    }

    pub fn original(&self) -> &[Option<Part>] {
        &self.original
    }

    pub fn output(&self) -> &[Option<Part>] {
        &self.output
    }

    /// Number of full pipeline runs so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    fn rerun(&mut self) {
        self.output = self.pipeline.apply_parts(&self.original);
        self.runs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::BuiltinStage;
    use crate::pipeline::stages::{Rebaseline, UnitNorm};
    use crate::types::TickInfo;
    use ndarray::array;

    fn parts() -> PartList {
        vec![Some(Part::with_sequential_channels(
            array![[1.0f32, 2.0, 9.0]],
            TickInfo::unit(3),
        ))]
    }

    #[test]
    fn test_stage_edits_rerun_from_original() {
        let mut view = SlotView::default();
        view.set_parts(parts());
        view.add_stage(BuiltinStage::UnitNorm(UnitNorm)).unwrap();
        view.add_stage(BuiltinStage::Rebaseline(Rebaseline)).unwrap();
        view.remove_stage("UnitNorm").unwrap();
        // Only rebaseline applied to the untouched input
        let out = view.output()[0].as_ref().unwrap();
        assert_eq!(out.samples, array![[-1.0, 0.0, 7.0]]);
        assert_eq!(view.original(), parts().as_slice());
        assert_eq!(view.runs(), 4);
    }

    #[test]
    fn test_toggle_stage() {
        let mut view = SlotView::default();
        view.set_parts(parts());
        assert!(view.toggle_stage(BuiltinStage::UnitNorm(UnitNorm)).unwrap());
        assert!(view.pipeline().has_stage("UnitNorm"));
        assert!(!view.toggle_stage(BuiltinStage::UnitNorm(UnitNorm)).unwrap());
        assert!(view.pipeline().is_empty());
        assert_eq!(view.output(), view.original());
    }
}
