//! Source manager: shared cursor, per-source cache and emission policy.
//!
//! Every registered source is driven by one global cursor `(index, layer)`.
//! Each navigation call pushes the cursor into every source, and a source
//! whose generation succeeds has its cache replaced. A failed generation
//! leaves that source's cache as it was, so the display keeps showing the
//! last good data.
//!
//! Emission is either the parts of one selected source, or the parts of every
//! source concatenated in registration order.

use crate::error::{FrameScopeError, Result, ResultExt};
use crate::source::{open_source, AnySource, DataSource, RandomSource, SourceSpec};
use crate::types::{Part, PartList};
use std::fmt;

/// Stable handle to a registered source. Never reused after removal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceId(pub u32);

impl SourceId {
    pub const INVALID: SourceId = SourceId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "SourceId(INVALID)")
        } else {
            write!(f, "SourceId({})", self.0)
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The global navigation cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub layer: usize,
}

/// A registered source and its last emission.
struct SourceSlot {
    source: AnySource,
    cache: Option<PartList>,
    /// Whether this source has been removed (slot is empty).
    removed: bool,
}

/// Which sources contribute to the emitted parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Source(SourceId),
}

/// Outcome of driving every source to a new cursor.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub cursor: Cursor,
    /// Sources whose cache was replaced
    pub refreshed: Vec<SourceId>,
    /// Sources whose generation failed; their caches are stale
    pub failures: Vec<(SourceId, FrameScopeError)>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Borrowed view of one source's cached emission.
#[derive(Debug)]
pub struct SourceData<'a> {
    pub id: SourceId,
    pub name: String,
    pub parts: &'a [Option<Part>],
}

#[derive(Default)]
pub struct SourceManager {
    slots: Vec<SourceSlot>,
    cursor: Cursor,
    selection: Selection,
}

impl fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceManager")
            .field("sources", &self.len())
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .finish()
    }
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Number of live sources.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| !s.removed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of live sources in display order.
    pub fn ids(&self) -> Vec<SourceId> {
        self.live().map(|(id, _)| id).collect()
    }

    fn live(&self) -> impl Iterator<Item = (SourceId, &SourceSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.removed)
            .map(|(i, s)| (SourceId(i as u32), s))
    }

    fn slot(&self, id: SourceId) -> Option<&SourceSlot> {
        self.slots.get(id.index()).filter(|s| !s.removed)
    }

    fn slot_mut(&mut self, id: SourceId) -> Option<&mut SourceSlot> {
        self.slots.get_mut(id.index()).filter(|s| !s.removed)
    }

    pub fn source(&self, id: SourceId) -> Option<&AnySource> {
        self.slot(id).map(|s| &s.source)
    }

    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut AnySource> {
        self.slot_mut(id).map(|s| &mut s.source)
    }

    /// Cached emission of one source, if it has produced any.
    pub fn cached(&self, id: SourceId) -> Option<&[Option<Part>]> {
        self.slot(id).and_then(|s| s.cache.as_deref())
    }

    // ── Registration ──

    /// Register a source, push the current cursor into it and cache the result.
    ///
    /// A failed first generation is logged; the source stays registered
    /// without a cache.
    pub fn add_source(&mut self, source: impl Into<AnySource>) -> SourceId {
        let id = SourceId(self.slots.len() as u32);
        let mut source = source.into();
        let cursor = self.cursor;
        if cursor.layer != source.layer() {
            // The layer sticks even when the source has no data at its
            // current position; the jump below regenerates anyway.
            if let Err(e) = source.set_layer(cursor.layer) {
                tracing::debug!("Source {:?} could not load layer {}: {}", source.name(), cursor.layer, e);
            }
        }
        let cache = match source.jump(cursor.index) {
            Ok(parts) => Some(parts),
            Err(e) => {
                tracing::warn!("Source {:?} has no data at {:?}: {}", source.name(), cursor, e);
                None
            }
        };
        tracing::info!("Registered source {} as {:?}", id, source.name());
        self.slots.push(SourceSlot {
            source,
            cache,
            removed: false,
        });
        id
    }

    /// Open an archive-backed source for a file set and register it.
    pub fn register(&mut self, spec: &SourceSpec) -> Result<SourceId> {
        let source = open_source(spec).with_context(|| {
            format!(
                "Failed to register {}",
                spec.name
                    .clone()
                    .unwrap_or_else(|| format!("{:?}", spec.paths))
            )
        })?;
        Ok(self.add_source(source))
    }

    /// Register a synthetic source with the given plane shapes.
    pub fn add_random(&mut self, shapes: Vec<(usize, usize)>) -> SourceId {
        self.add_source(RandomSource::new(shapes))
    }

    /// Remove a source. Its id is never handed out again.
    pub fn remove_source(&mut self, id: SourceId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.removed = true;
        slot.cache = None;
        if self.selection == Selection::Source(id) {
            self.selection = Selection::All;
        }
        tracing::info!("Removed source {}", id);
        true
    }

    // ── Navigation ──

    pub fn next(&mut self) -> RefreshReport {
        self.jump(self.cursor.index.saturating_add(1))
    }

    /// Step back, flooring at index 0.
    pub fn prev(&mut self) -> RefreshReport {
        self.jump(self.cursor.index.saturating_sub(1))
    }

    /// Move every source to `index`.
    pub fn jump(&mut self, index: usize) -> RefreshReport {
        self.cursor.index = index;
        tracing::debug!("Cursor moved to {:?}", self.cursor);
        self.drive(|source| source.jump(index))
    }

    /// Change the shared layer. Returns `None` if it is unchanged.
    pub fn set_layer(&mut self, layer: usize) -> Option<RefreshReport> {
        if layer == self.cursor.layer {
            return None;
        }
        self.cursor.layer = layer;
        tracing::debug!("Cursor layer set to {}", layer);
        Some(self.drive(|source| source.set_layer(layer)))
    }

    /// Regenerate every source at its current position.
    pub fn refresh(&mut self) -> RefreshReport {
        self.drive(|source| source.generate())
    }

    fn drive<F>(&mut self, mut op: F) -> RefreshReport
    where
        F: FnMut(&mut AnySource) -> Result<PartList>,
    {
        let mut report = RefreshReport {
            cursor: self.cursor,
            ..RefreshReport::default()
        };
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.removed {
                continue;
            }
            let id = SourceId(i as u32);
            match op(&mut slot.source) {
                Ok(parts) => {
                    slot.cache = Some(parts);
                    report.refreshed.push(id);
                }
                Err(e) => {
                    tracing::warn!(
                        "Source {:?} kept stale data at {:?}: {}",
                        slot.source.name(),
                        self.cursor,
                        e
                    );
                    report.failures.push((id, e));
                }
            }
        }
        report
    }

    // ── Selection and emission ──

    /// Select the live source whose display name is `name`.
    ///
    /// Zero or several matches leave the selection unchanged.
    pub fn select(&mut self, name: &str) -> bool {
        let matches: Vec<SourceId> = self
            .live()
            .filter(|(_, s)| s.source.name() == name)
            .map(|(id, _)| id)
            .collect();
        match matches.as_slice() {
            [id] => {
                self.selection = Selection::Source(*id);
                true
            }
            [] => {
                tracing::warn!("No source named {:?}", name);
                false
            }
            _ => {
                tracing::warn!(
                    "{} sources are named {:?}; select by id instead",
                    matches.len(),
                    name
                );
                false
            }
        }
    }

    pub fn select_id(&mut self, id: SourceId) -> bool {
        if self.slot(id).is_none() {
            return false;
        }
        self.selection = Selection::Source(id);
        true
    }

    /// Emit every source's parts again.
    pub fn select_all(&mut self) {
        self.selection = Selection::All;
    }

    /// Parts currently shown: the selected source's, or all sources' in order.
    pub fn emitted(&self) -> Vec<Option<&Part>> {
        match self.selection {
            Selection::Source(id) => self
                .cached(id)
                .map(|parts| parts.iter().map(Option::as_ref).collect())
                .unwrap_or_default(),
            Selection::All => self
                .live()
                .filter_map(|(_, s)| s.cache.as_deref())
                .flat_map(|parts| parts.iter().map(Option::as_ref))
                .collect(),
        }
    }

    /// Every live source with its cached parts (empty when none yet).
    pub fn get_all_sources_data(&self) -> Vec<SourceData<'_>> {
        self.live()
            .map(|(id, s)| SourceData {
                id,
                name: s.source.name(),
                parts: s.cache.as_deref().unwrap_or(&[]),
            })
            .collect()
    }

    /// Cached parts of the selected source, or of the first source.
    pub fn get_current_source_data(&self) -> Option<SourceData<'_>> {
        let id = match self.selection {
            Selection::Source(id) => id,
            Selection::All => self.live().next()?.0,
        };
        let slot = self.slot(id)?;
        Some(SourceData {
            id,
            name: slot.source.name(),
            parts: slot.cache.as_deref().unwrap_or(&[]),
        })
    }

    /// Display names of live sources in order.
    pub fn source_names(&self) -> Vec<String> {
        self.live().map(|(_, s)| s.source.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockDataSource;
    use crate::types::TickInfo;
    use ndarray::Array2;

    fn part(value: f32) -> Part {
        Part::with_sequential_channels(Array2::from_elem((1, 2), value), TickInfo::unit(2))
    }

    fn boxed(mock: MockDataSource) -> AnySource {
        AnySource::from(Box::new(mock) as Box<dyn DataSource>)
    }

    /// A mock that accepts any jump and returns one part holding the index.
    fn echo_mock(name: &'static str) -> MockDataSource {
        let mut mock = MockDataSource::new();
        mock.expect_layer().return_const(0usize);
        mock.expect_name().return_const(name.to_string());
        mock.expect_jump()
            .returning(|i| Ok(vec![Some(part(i as f32))]));
        mock
    }

    #[test]
    fn test_source_id() {
        assert!(SourceId(3).is_valid());
        assert_eq!(SourceId(3).index(), 3);
        assert!(!SourceId::INVALID.is_valid());
    }

    #[test]
    fn test_registration_pushes_cursor_and_caches() {
        let mut mgr = SourceManager::new();
        let id = mgr.add_source(boxed(echo_mock("a")));
        assert_eq!(mgr.cached(id).unwrap().len(), 1);
        assert_eq!(mgr.emitted().len(), 1);
    }

    #[test]
    fn test_prev_floors_at_zero() {
        let mut mgr = SourceManager::new();
        mgr.add_source(boxed(echo_mock("a")));
        let report = mgr.prev();
        assert_eq!(report.cursor.index, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_failed_generation_keeps_stale_cache() {
        let mut mock = MockDataSource::new();
        mock.expect_layer().return_const(0usize);
        mock.expect_name().return_const("f".to_string());
        mock.expect_jump().returning(|i| {
            if i == 0 {
                Ok(vec![Some(part(0.0))])
            } else {
                Err(FrameScopeError::IndexOutOfRange { index: i, len: 1 })
            }
        });
        let mut mgr = SourceManager::new();
        let id = mgr.add_source(boxed(mock));

        let report = mgr.next();
        assert_eq!(report.cursor.index, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, id);
        // Cache still holds index 0
        let cached = mgr.cached(id).unwrap();
        assert_eq!(cached[0].as_ref().unwrap().samples[[0, 0]], 0.0);
    }

    #[test]
    fn test_set_layer_skips_unchanged_value() {
        let mut mock = echo_mock("a");
        mock.expect_set_layer()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let mut mgr = SourceManager::new();
        mgr.add_source(boxed(mock));
        assert!(mgr.set_layer(0).is_none());
        assert!(mgr.set_layer(2).is_some());
        assert!(mgr.set_layer(2).is_none());
        assert_eq!(mgr.cursor().layer, 2);
    }

    #[test]
    fn test_selection_and_aggregate_emission() {
        let mut mgr = SourceManager::new();
        let a = mgr.add_random(vec![(2, 3)]);
        mgr.add_random(vec![(4, 3), (5, 3)]);
        assert_eq!(mgr.emitted().len(), 3);

        mgr.source_mut(a)
            .unwrap()
            .set_display_name(Some("first".to_string()));
        assert!(mgr.select("first"));
        assert_eq!(mgr.emitted().len(), 1);
        assert!(!mgr.select("missing"));
        assert_eq!(mgr.selection(), Selection::Source(a));

        mgr.select_all();
        assert_eq!(mgr.emitted().len(), 3);
    }

    #[test]
    fn test_ambiguous_name_is_not_selected() {
        let mut mgr = SourceManager::new();
        mgr.add_source(boxed(echo_mock("dup")));
        mgr.add_source(boxed(echo_mock("dup")));
        assert!(!mgr.select("dup"));
        assert_eq!(mgr.selection(), Selection::All);
    }

    #[test]
    fn test_remove_source_keeps_ids_stable() {
        let mut mgr = SourceManager::new();
        let a = mgr.add_random(vec![(1, 1)]);
        let b = mgr.add_random(vec![(1, 1)]);
        assert!(mgr.select_id(a));
        assert!(mgr.remove_source(a));
        assert!(!mgr.remove_source(a));
        assert_eq!(mgr.selection(), Selection::All);
        assert_eq!(mgr.ids(), vec![b]);
        let c = mgr.add_random(vec![(1, 1)]);
        assert_ne!(c, a);
        assert!(mgr.source(a).is_none());
    }

    #[test]
    fn test_current_source_data_defaults_to_first() {
        let mut mgr = SourceManager::new();
        assert!(mgr.get_current_source_data().is_none());
        let a = mgr.add_random(vec![(1, 1)]);
        let b = mgr.add_random(vec![(2, 1)]);
        assert_eq!(mgr.get_current_source_data().unwrap().id, a);
        mgr.select_id(b);
        let current = mgr.get_current_source_data().unwrap();
        assert_eq!(current.id, b);
        assert_eq!(current.parts.len(), 1);
        assert_eq!(mgr.get_all_sources_data().len(), 2);
    }
}
