//! Data sources.
//!
//! A source turns one inventory position into a list of [`Part`]s. Three
//! variants exist: archive-backed frame and tensor sources, and a synthetic
//! random source.
//!
//! Two-layer design:
//! - **`DataSource` trait**: the fixed method set every source offers, and the
//!   seam for externally supplied sources.
//! - **`BuiltinSource` enum**: the built-in variants, dispatched by `match`.
//!
//! `AnySource` wraps either so the [`SourceManager`](crate::manager::SourceManager)
//! can hold a heterogeneous list.
//!
//! [`Part`]: crate::types::Part

pub mod frame;
pub mod random;
pub mod spec;
pub mod tensor;

pub use frame::{FrameEntry, FrameSource};
pub use random::RandomSource;
pub use spec::{parse_entries, SourceSpec};
pub use tensor::{TensorEntry, TensorSource};

use crate::error::{FrameScopeError, Result};
use crate::schema::{self, Schema};
use crate::types::PartList;

/// The interface shared by all sources.
///
/// Navigation methods regenerate and return the new parts. On failure the
/// source keeps its previous position and parts.
#[cfg_attr(test, mockall::automock)]
pub trait DataSource {
    /// Display name; a user-assigned name wins over the generated one.
    fn name(&self) -> String;

    /// Assign or clear the user display name.
    fn set_display_name(&mut self, name: Option<String>);

    /// Current inventory position.
    fn index(&self) -> usize;

    /// Current layer (only meaningful for volumetric data).
    fn layer(&self) -> usize;

    /// Inventory length, or `None` for an unbounded source.
    fn inventory_len(&self) -> Option<usize>;

    /// Parts of the most recent successful generation.
    fn parts(&self) -> PartList;

    /// Regenerate at the current position.
    fn generate(&mut self) -> Result<PartList>;

    /// Move to `index` and regenerate.
    fn jump(&mut self, index: usize) -> Result<PartList>;

    /// Change the layer and regenerate.
    fn set_layer(&mut self, layer: usize) -> Result<PartList>;

    /// Step forward within the inventory.
    fn next(&mut self) -> Result<PartList> {
        self.jump(self.index() + 1)
    }

    /// Step back, flooring at the first position.
    fn prev(&mut self) -> Result<PartList> {
        self.jump(self.index().saturating_sub(1))
    }
}

/// Check a position against an inventory length.
pub(crate) fn check_position(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(FrameScopeError::IndexOutOfRange { index, len })
    }
}

/// Enum dispatch for the built-in sources.
#[derive(Debug)]
pub enum BuiltinSource {
    Frame(FrameSource),
    Tensor(TensorSource),
    Random(RandomSource),
}

macro_rules! dispatch {
    ($self:ident, $s:ident => $body:expr) => {
        match $self {
            BuiltinSource::Frame($s) => $body,
            BuiltinSource::Tensor($s) => $body,
            BuiltinSource::Random($s) => $body,
        }
    };
}

impl BuiltinSource {
    /// Short label of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            BuiltinSource::Frame(_) => "frame",
            BuiltinSource::Tensor(_) => "tensor",
            BuiltinSource::Random(_) => "random",
        }
    }
}

impl DataSource for BuiltinSource {
    fn name(&self) -> String {
        dispatch!(self, s => s.name())
    }

    fn set_display_name(&mut self, name: Option<String>) {
        dispatch!(self, s => s.set_display_name(name))
    }

    fn index(&self) -> usize {
        dispatch!(self, s => s.index())
    }

    fn layer(&self) -> usize {
        dispatch!(self, s => s.layer())
    }

    fn inventory_len(&self) -> Option<usize> {
        dispatch!(self, s => s.inventory_len())
    }

    fn parts(&self) -> PartList {
        dispatch!(self, s => s.parts())
    }

    fn generate(&mut self) -> Result<PartList> {
        dispatch!(self, s => s.generate())
    }

    fn jump(&mut self, index: usize) -> Result<PartList> {
        dispatch!(self, s => s.jump(index))
    }

    fn set_layer(&mut self, layer: usize) -> Result<PartList> {
        dispatch!(self, s => s.set_layer(layer))
    }
}

/// Wrapper that holds either a built-in source or an external one.
pub enum AnySource {
    Builtin(BuiltinSource),
    Plugin(Box<dyn DataSource>),
}

impl std::fmt::Debug for AnySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnySource::Builtin(s) => f.debug_tuple("Builtin").field(s).finish(),
            AnySource::Plugin(s) => f.debug_tuple("Plugin").field(&s.name()).finish(),
        }
    }
}

impl AnySource {
    fn inner(&self) -> &dyn DataSource {
        match self {
            AnySource::Builtin(s) => s,
            AnySource::Plugin(s) => s.as_ref(),
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DataSource {
        match self {
            AnySource::Builtin(s) => s,
            AnySource::Plugin(s) => s.as_mut(),
        }
    }
}

impl DataSource for AnySource {
    fn name(&self) -> String {
        self.inner().name()
    }

    fn set_display_name(&mut self, name: Option<String>) {
        self.inner_mut().set_display_name(name)
    }

    fn index(&self) -> usize {
        self.inner().index()
    }

    fn layer(&self) -> usize {
        self.inner().layer()
    }

    fn inventory_len(&self) -> Option<usize> {
        self.inner().inventory_len()
    }

    fn parts(&self) -> PartList {
        self.inner().parts()
    }

    fn generate(&mut self) -> Result<PartList> {
        self.inner_mut().generate()
    }

    fn jump(&mut self, index: usize) -> Result<PartList> {
        self.inner_mut().jump(index)
    }

    fn set_layer(&mut self, layer: usize) -> Result<PartList> {
        self.inner_mut().set_layer(layer)
    }

    fn next(&mut self) -> Result<PartList> {
        self.inner_mut().next()
    }

    fn prev(&mut self) -> Result<PartList> {
        self.inner_mut().prev()
    }
}

impl From<BuiltinSource> for AnySource {
    fn from(source: BuiltinSource) -> Self {
        AnySource::Builtin(source)
    }
}

impl From<FrameSource> for AnySource {
    fn from(source: FrameSource) -> Self {
        AnySource::Builtin(BuiltinSource::Frame(source))
    }
}

impl From<TensorSource> for AnySource {
    fn from(source: TensorSource) -> Self {
        AnySource::Builtin(BuiltinSource::Tensor(source))
    }
}

impl From<RandomSource> for AnySource {
    fn from(source: RandomSource) -> Self {
        AnySource::Builtin(BuiltinSource::Random(source))
    }
}

impl From<Box<dyn DataSource>> for AnySource {
    fn from(source: Box<dyn DataSource>) -> Self {
        AnySource::Plugin(source)
    }
}

/// Build an archive-backed source for a file set.
///
/// The schema is detected from the first archive; detection failures are
/// returned and no source is created.
pub fn open_source(spec: &SourceSpec) -> Result<BuiltinSource> {
    let mut source = match schema::detect(&spec.paths)? {
        Schema::Frame => BuiltinSource::Frame(FrameSource::new(&spec.paths)),
        Schema::Tensor => BuiltinSource::Tensor(TensorSource::new(&spec.paths)),
    };
    if spec.name.is_some() {
        source.set_display_name(spec.name.clone());
    }
    tracing::info!(
        "Opened {} source {:?} over {} archive(s), inventory {:?}",
        source.kind(),
        source.name(),
        spec.paths.len(),
        source.inventory_len()
    );
    Ok(source)
}
