//! # FrameScope-RS: multi-channel frame navigator
//!
//! Reads archived waveform snapshots ("frames") from `.npz` archives, splits
//! them into per-plane parts, and keeps several sources on one shared
//! navigation cursor.
//!
//! ## Architecture
//!
//! - **Schema**: classifies an archive as frame-grammar or tensor-grammar
//! - **Sources**: frame, tensor and synthetic random sources behind one trait
//! - **Manager**: shared `(index, layer)` cursor, per-source cache, selection
//! - **Pipeline**: ordered stateless transforms (Rebaseline, UnitNorm)
//! - **Crosshair**: column sync across display slots
//!
//! ## Configuration
//!
//! Viewer settings live in `config.toml` under the platform config directory
//! in `dev.framescope.framescope-rs`.
//!
//! ## Example
//!
//! ```ignore
//! use framescope_rs::{
//!     manager::SourceManager,
//!     pipeline::{Pipeline, SlotView},
//!     source::parse_entries,
//! };
//!
//! let mut manager = SourceManager::new();
//! for spec in parse_entries(["tpc:run1.npz,tpc:run2.npz"]) {
//!     manager.register(&spec)?;
//! }
//! manager.next();
//!
//! let mut view = SlotView::new(Pipeline::from_names(&["Rebaseline"])?);
//! view.set_parts_from(&manager.emitted());
//! ```

pub mod archive;
pub mod config;
pub mod crosshair;
pub mod detector;
pub mod error;
pub mod manager;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use error::{FrameScopeError, Result, ResultExt};
pub use manager::{Cursor, RefreshReport, SourceId, SourceManager};
pub use source::{AnySource, BuiltinSource, DataSource, SourceSpec};
pub use types::{Part, PartList, TickInfo};
