//! Transform pipeline.
//!
//! An ordered, mutable list of named stateless stages applied to the parts a
//! [`SourceManager`](crate::manager::SourceManager) emits, before they reach a
//! display slot.
//!
//! ```text
//! parts ──► [Rebaseline] ──► [UnitNorm] ──► display
//! ```
//!
//! # Design
//!
//! - **Enum dispatch**: `BuiltinStage` enum for the built-in stages.
//! - **No memoization**: a [`SlotView`] reruns every stage from the
//!   untransformed parts whenever its input or its stage list changes.

pub mod error;
pub mod executor;
pub mod stage;
pub mod stages;
pub mod view;

pub use error::{PipelineError, PipelineResult};
pub use executor::Pipeline;
pub use stage::{AnyStage, BuiltinStage, StagePlugin};
pub use stages::{Rebaseline, UnitNorm};
pub use view::SlotView;
