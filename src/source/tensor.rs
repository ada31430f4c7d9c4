//! Tensor-grammar source
//!
//! Each inventory position is one `(archive, index)` pair. Planes are found
//! per generation, so an index may carry any number of them. Volumetric
//! (3-D) planes are sliced at the current layer.

use super::{check_position, DataSource};
use crate::archive::{Archive, ArchiveReader};
use crate::error::{FrameScopeError, Result, ResultExt};
use crate::schema::{self, TENSOR_PREFIX};
use crate::types::{Part, PartList, TickInfo};
use ndarray::{ArrayD, Axis, Ix2};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One `(archive, index)` pair in the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorEntry {
    pub archive: Archive,
    pub index: u64,
}

/// JSON sidecar attached to a tensor plane.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TensorMetadata {
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub period: Option<f64>,
}

impl TensorMetadata {
    /// Tick timing for a plane with `columns` ticks.
    pub fn tick_info(&self, columns: usize) -> TickInfo {
        match (self.time, self.period) {
            (Some(start), Some(period)) => TickInfo::new(start, period, columns),
            _ => TickInfo::unit(columns),
        }
    }
}

#[derive(Debug)]
pub struct TensorSource {
    archives: Vec<Archive>,
    inventory: Vec<TensorEntry>,
    position: usize,
    layer: usize,
    layer_count: usize,
    display_name: Option<String>,
    parts: PartList,
}

impl TensorSource {
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Self {
        let archives: Vec<Archive> = paths.iter().map(|p| Archive::new(p.as_ref())).collect();
        let inventory = build_inventory(&archives);
        Self {
            archives,
            inventory,
            position: 0,
            layer: 0,
            layer_count: 0,
            display_name: None,
            parts: Vec::new(),
        }
    }

    pub fn inventory(&self) -> &[TensorEntry] {
        &self.inventory
    }

    /// Largest layer count among the planes of the last generation.
    ///
    /// Zero until a volumetric (3-D) plane has been loaded, even one with a
    /// single layer.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Load the parts of one position at a layer without moving.
    pub fn load(&self, position: usize, layer: usize) -> Result<(PartList, usize)> {
        check_position(position, self.inventory.len())?;
        let entry = &self.inventory[position];
        let mut reader = entry.archive.open()?;
        load_planes(&mut reader, entry.index, layer).with_context(|| {
            format!(
                "Failed to load tensor [{}] from {}",
                entry.index,
                entry.archive.file_name()
            )
        })
    }

    fn generate_at(&mut self, position: usize) -> Result<PartList> {
        let (parts, layer_count) = self.load(position, self.layer)?;
        tracing::debug!(
            "Tensor source {:?}: position {} layer {} gave {} plane(s)",
            self.name(),
            position,
            self.layer,
            parts.len()
        );
        self.position = position;
        self.layer_count = layer_count;
        self.parts = parts.clone();
        Ok(parts)
    }
}

/// Distinct `(archive, index)` pairs, stable-sorted by index.
pub fn build_inventory(archives: &[Archive]) -> Vec<TensorEntry> {
    let mut inventory: Vec<TensorEntry> = Vec::new();
    for archive in archives {
        let names = match archive.names() {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Skipping archive {:?}: {}", archive.path(), e);
                continue;
            }
        };
        let mut seen = Vec::new();
        for name in names.iter().filter(|n| n.starts_with(TENSOR_PREFIX)) {
            if let Some((index, _plane)) = schema::parse_tensor_array(name) {
                if !seen.contains(&index) {
                    seen.push(index);
                }
            }
        }
        inventory.extend(seen.into_iter().map(|index| TensorEntry {
            archive: archive.clone(),
            index,
        }));
    }
    inventory.sort_by_key(|e| e.index);
    inventory
}

/// Reduce a plane array to two dimensions, slicing volumes at a clamped layer.
///
/// Returns the 2-D samples and the number of layers (1 for flat planes).
fn flatten_plane(name: &str, array: ArrayD<f32>, layer: usize) -> Result<(ndarray::Array2<f32>, usize)> {
    let invalid = |message: String| FrameScopeError::InvalidArray {
        name: name.to_string(),
        message,
    };
    match array.ndim() {
        2 => {
            let flat = array
                .into_dimensionality::<Ix2>()
                .map_err(|e| invalid(e.to_string()))?;
            Ok((flat, 1))
        }
        3 => {
            let layers = array.len_of(Axis(0));
            if layers == 0 {
                return Err(invalid("volume has no layers".to_string()));
            }
            let clamped = layer.min(layers - 1);
            let flat = array
                .index_axis(Axis(0), clamped)
                .to_owned()
                .into_dimensionality::<Ix2>()
                .map_err(|e| invalid(e.to_string()))?;
            Ok((flat, layers))
        }
        n => Err(invalid(format!("expected 2 or 3 dimensions, found {}", n))),
    }
}

/// Prefer the sidecar written with the array's own tokens, then the
/// unpadded form.
fn sidecar_name(reader: &ArchiveReader, array_name: &str, index: u64, plane: u64) -> String {
    schema::tensor_sidecar_for(array_name)
        .filter(|name| reader.contains(name))
        .unwrap_or_else(|| schema::tensor_metadata_name(index, plane))
}

fn read_metadata(reader: &mut ArchiveReader, name: &str) -> Result<TensorMetadata> {
    if !reader.contains(name) {
        return Ok(TensorMetadata::default());
    }
    let text = reader.read_text(name)?;
    serde_json::from_str(&text).map_err(|e| FrameScopeError::Metadata {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Load every plane of one index, ascending by plane number.
fn load_planes(reader: &mut ArchiveReader, index: u64, layer: usize) -> Result<(PartList, usize)> {
    let planes: BTreeMap<u64, String> = reader
        .names()
        .iter()
        .filter_map(|name| match schema::parse_tensor_array(name) {
            Some((i, plane)) if i == index => Some((plane, name.clone())),
            _ => None,
        })
        .collect();
    if planes.is_empty() {
        return Err(FrameScopeError::MissingArray {
            path: reader.path().to_path_buf(),
            name: format!("tensor_{}_*_array", index),
        });
    }

    let mut parts = Vec::with_capacity(planes.len());
    let mut layer_count = 0;
    for (plane, name) in planes {
        let array = reader.read_f32(&name)?;
        let array_is_volume = array.ndim() == 3;
        let (samples, layers) = flatten_plane(&name, array, layer)?;
        if array_is_volume {
            layer_count = layer_count.max(layers);
        }
        let sidecar = sidecar_name(reader, &name, index, plane);
        let metadata = read_metadata(reader, &sidecar)?;
        let tick_info = metadata.tick_info(samples.ncols());
        parts.push(Some(Part::with_sequential_channels(samples, tick_info)));
    }
    Ok((parts, layer_count))
}

impl DataSource for TensorSource {
    fn name(&self) -> String {
        if let Some(name) = &self.display_name {
            return name.clone();
        }
        match self.inventory.get(self.position) {
            Some(entry) => format!("{} | tensor [{}]", entry.archive.file_name(), entry.index),
            None => self
                .archives
                .first()
                .map(Archive::file_name)
                .unwrap_or_else(|| "No data".to_string()),
        }
    }

    fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    fn index(&self) -> usize {
        self.position
    }

    fn layer(&self) -> usize {
        self.layer
    }

    fn inventory_len(&self) -> Option<usize> {
        Some(self.inventory.len())
    }

    fn parts(&self) -> PartList {
        self.parts.clone()
    }

    fn generate(&mut self) -> Result<PartList> {
        self.generate_at(self.position)
    }

    fn jump(&mut self, index: usize) -> Result<PartList> {
        self.generate_at(index)
    }

    /// The layer is recorded even if regeneration fails, so it keeps
    /// following the shared cursor.
    fn set_layer(&mut self, layer: usize) -> Result<PartList> {
        self.layer = layer;
        self.generate_at(self.position)
    }
}
