//! Frame-grammar source
//!
//! Reads `frame_/channels_/tickinfo_` triples and splits each frame into the
//! planes of the detector matching its channel count.

use super::{check_position, DataSource};
use crate::archive::{Archive, ArchiveReader};
use crate::detector::{self, Detector};
use crate::error::{FrameScopeError, Result, ResultExt};
use crate::schema::{self, FRAME_PREFIX};
use crate::types::{Part, PartList, TickInfo};
use ndarray::{s, Array1, Array2, ArrayD, Ix2};
use std::collections::HashSet;
use std::path::Path;

/// One complete triple in the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    pub archive: Archive,
    pub tag: String,
    /// Index as written in the archive names.
    pub token: String,
    pub index: u64,
}

#[derive(Debug)]
pub struct FrameSource {
    archives: Vec<Archive>,
    inventory: Vec<FrameEntry>,
    position: usize,
    layer: usize,
    display_name: Option<String>,
    parts: PartList,
    detector: Option<Detector>,
}

impl FrameSource {
    /// Build the inventory over a file set.
    ///
    /// Unreadable archives are skipped with a warning.
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Self {
        let archives: Vec<Archive> = paths.iter().map(|p| Archive::new(p.as_ref())).collect();
        let inventory = build_inventory(&archives);
        Self {
            archives,
            inventory,
            position: 0,
            layer: 0,
            display_name: None,
            parts: Vec::new(),
            detector: None,
        }
    }

    pub fn inventory(&self) -> &[FrameEntry] {
        &self.inventory
    }

    pub fn archives(&self) -> &[Archive] {
        &self.archives
    }

    /// Detector of the last successful generation.
    pub fn detector(&self) -> Option<&Detector> {
        self.detector.as_ref()
    }

    /// Load the parts of one inventory position without moving.
    pub fn load(&self, position: usize) -> Result<(PartList, Detector)> {
        check_position(position, self.inventory.len())?;
        let entry = &self.inventory[position];
        let mut reader = entry.archive.open()?;
        load_triple(&mut reader, &entry.tag, &entry.token).with_context(|| {
            format!(
                "Failed to load {} [{}] from {}",
                entry.tag,
                entry.token,
                entry.archive.file_name()
            )
        })
    }

    fn generate_at(&mut self, position: usize) -> Result<PartList> {
        let (parts, detector) = self.load(position)?;
        tracing::debug!(
            "Frame source {:?}: position {} split into {} plane(s) of {}",
            self.name(),
            position,
            detector.plane_count(),
            detector.name
        );
        self.position = position;
        self.detector = Some(detector);
        self.parts = parts.clone();
        Ok(parts)
    }
}

/// Scan archives in order, concatenate their triples and stable-sort by index.
pub fn build_inventory(archives: &[Archive]) -> Vec<FrameEntry> {
    let mut inventory = Vec::new();
    for archive in archives {
        match scan_archive(archive) {
            Ok(entries) => inventory.extend(entries),
            Err(e) => tracing::warn!("Skipping archive {:?}: {}", archive.path(), e),
        }
    }
    inventory.sort_by_key(|e| e.index);
    inventory
}

fn scan_archive(archive: &Archive) -> Result<Vec<FrameEntry>> {
    let names = archive.names()?;
    let present: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut entries = Vec::new();
    for name in names.iter().filter(|n| n.starts_with(FRAME_PREFIX)) {
        let Some(key) = schema::parse_frame_key(name, "frame") else {
            continue;
        };
        let channels = schema::channels_array_name(key.tag, key.token);
        let tickinfo = schema::tickinfo_array_name(key.tag, key.token);
        if present.contains(channels.as_str()) && present.contains(tickinfo.as_str()) {
            entries.push(FrameEntry {
                archive: archive.clone(),
                tag: key.tag.to_string(),
                token: key.token.to_string(),
                index: key.index,
            });
        } else {
            let skipped = FrameScopeError::IncompleteTriple {
                path: archive.path().to_path_buf(),
                tag: key.tag.to_string(),
                index: key.index,
            };
            tracing::debug!("{}", skipped);
        }
    }
    Ok(entries)
}

fn to_2d(name: &str, array: ArrayD<f32>) -> Result<Array2<f32>> {
    array
        .into_dimensionality::<Ix2>()
        .map_err(|e| FrameScopeError::InvalidArray {
            name: name.to_string(),
            message: e.to_string(),
        })
}

/// Read one triple and split it into plane-aligned parts.
fn load_triple(reader: &mut ArchiveReader, tag: &str, token: &str) -> Result<(PartList, Detector)> {
    let frame_name = schema::frame_array_name(tag, token);
    let channels_name = schema::channels_array_name(tag, token);
    let tickinfo_name = schema::tickinfo_array_name(tag, token);

    let frame = to_2d(&frame_name, reader.read_f32(&frame_name)?)?;
    let channels: Array1<i64> = reader.read_i64(&channels_name)?.iter().copied().collect();
    let raw_tickinfo: Vec<f64> = reader.read_f64(&tickinfo_name)?.iter().copied().collect();
    let tick_info =
        TickInfo::from_slice(&raw_tickinfo).ok_or_else(|| FrameScopeError::InvalidArray {
            name: tickinfo_name.clone(),
            message: format!("expected 3 values, found {}", raw_tickinfo.len()),
        })?;

    if channels.len() != frame.nrows() {
        return Err(FrameScopeError::InvalidArray {
            name: channels_name,
            message: format!(
                "{} channel ids for {} frame rows",
                channels.len(),
                frame.nrows()
            ),
        });
    }
    if tick_info.count != frame.ncols() {
        tracing::debug!(
            "{}: tick count {} disagrees with {} columns",
            tickinfo_name,
            tick_info.count,
            frame.ncols()
        );
    }

    let detector = detector::lookup(frame.nrows());
    let parts = detector
        .plane_ranges()
        .into_iter()
        .map(|range| {
            range.map(|r| Part {
                samples: frame.slice(s![r.clone(), ..]).to_owned(),
                channel_ids: channels.slice(s![r]).to_owned(),
                tick_info,
            })
        })
        .collect();
    Ok((parts, detector))
}

impl DataSource for FrameSource {
    fn name(&self) -> String {
        if let Some(name) = &self.display_name {
            return name.clone();
        }
        match self.inventory.get(self.position) {
            Some(entry) => format!(
                "{} | {} [{}]",
                entry.archive.file_name(),
                entry.tag,
                entry.token
            ),
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

    fn set_layer(&mut self, layer: usize) -> Result<PartList> {
        // Frames are two-dimensional; the layer is recorded only.
        self.layer = layer;
        self.generate_at(self.position)
    }
}
