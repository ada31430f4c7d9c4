//! Archive naming grammars and schema detection
//!
//! Two grammars are understood:
//!
//! - **Frame**: `frame_<tag>_<index>`, `channels_<tag>_<index>` and
//!   `tickinfo_<tag>_<index>`, where `<tag>` may contain underscores and
//!   `<index>` is the last underscore-delimited token.
//! - **Tensor**: `tensor_<index>_<plane>_array`, optionally with a
//!   `tensor_<index>_<plane>_metadata.json` sidecar.
//!
//! Detection looks only at the first archive of a file set. An archive that
//! carries all three frame-grammar prefixes is Frame; any other readable
//! archive with at least one array is treated as Tensor.

use crate::archive::Archive;
use crate::error::{FrameScopeError, Result};
use std::path::Path;

pub const FRAME_PREFIX: &str = "frame_";
pub const CHANNELS_PREFIX: &str = "channels_";
pub const TICKINFO_PREFIX: &str = "tickinfo_";
pub const TENSOR_PREFIX: &str = "tensor_";
pub const TENSOR_ARRAY_SUFFIX: &str = "_array";
pub const TENSOR_METADATA_SUFFIX: &str = "_metadata.json";

/// Which grammar an archive follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Frame,
    Tensor,
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schema::Frame => write!(f, "frame"),
            Schema::Tensor => write!(f, "tensor"),
        }
    }
}

/// Classify an archive from its array names.
///
/// Returns `None` only when there are no names at all.
pub fn classify<S: AsRef<str>>(names: &[S]) -> Option<Schema> {
    if names.is_empty() {
        return None;
    }
    let has = |prefix: &str| names.iter().any(|n| n.as_ref().starts_with(prefix));
    if has(FRAME_PREFIX) && has(CHANNELS_PREFIX) && has(TICKINFO_PREFIX) {
        Some(Schema::Frame)
    } else {
        Some(Schema::Tensor)
    }
}

/// Detect the schema of the first archive in a file set.
pub fn detect<P: AsRef<Path>>(paths: &[P]) -> Result<Schema> {
    let first = paths.first().ok_or(FrameScopeError::NoArchives)?.as_ref();
    let names = Archive::new(first).names()?;
    let schema = classify(&names).ok_or_else(|| FrameScopeError::SchemaMismatch {
        path: first.to_path_buf(),
    })?;
    tracing::debug!("Detected {} schema in {:?}", schema, first);
    Ok(schema)
}

/// A parsed frame-grammar key.
///
/// `token` is the index exactly as written in the archive, leading zeros
/// included; sibling array names are built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameKey<'a> {
    pub category: &'a str,
    pub tag: &'a str,
    pub token: &'a str,
    pub index: u64,
}

/// Split `<category>_<tag>_<index>` for one of the frame categories.
pub fn parse_frame_key<'a>(name: &'a str, category: &'a str) -> Option<FrameKey<'a>> {
    let rest = name.strip_prefix(category)?.strip_prefix('_')?;
    let (tag, index) = rest.rsplit_once('_')?;
    if tag.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(FrameKey {
        category,
        tag,
        token: index,
        index: index.parse().ok()?,
    })
}

pub fn frame_array_name(tag: &str, token: &str) -> String {
    format!("frame_{}_{}", tag, token)
}

pub fn channels_array_name(tag: &str, token: &str) -> String {
    format!("channels_{}_{}", tag, token)
}

pub fn tickinfo_array_name(tag: &str, token: &str) -> String {
    format!("tickinfo_{}_{}", tag, token)
}

/// Parse `tensor_<index>_<plane>_array` into `(index, plane)`.
pub fn parse_tensor_array(name: &str) -> Option<(u64, u64)> {
    let middle = name
        .strip_prefix(TENSOR_PREFIX)?
        .strip_suffix(TENSOR_ARRAY_SUFFIX)?;
    let (index, plane) = middle.split_once('_')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(index) || !digits(plane) {
        return None;
    }
    Some((index.parse().ok()?, plane.parse().ok()?))
}

pub fn tensor_array_name(index: u64, plane: u64) -> String {
    format!("tensor_{}_{}_array", index, plane)
}

pub fn tensor_metadata_name(index: u64, plane: u64) -> String {
    format!("tensor_{}_{}_metadata.json", index, plane)
}

/// Sidecar name sharing the stem of an array name, so padded tokens carry over.
pub fn tensor_sidecar_for(array_name: &str) -> Option<String> {
    let stem = array_name.strip_suffix(TENSOR_ARRAY_SUFFIX)?;
    Some(format!("{}{}", stem, TENSOR_METADATA_SUFFIX))
}
