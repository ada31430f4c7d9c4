//! Named-array archives (`.npz`)
//!
//! An [`Archive`] is only a path. Every access opens the file, reads what it
//! needs through an [`ArchiveReader`] and closes it again when the reader is
//! dropped; no handle outlives a single inventory scan or generation.
//!
//! Stored dtypes vary between producers (frames may be `int16`, `float32`,
//! ...), so the typed readers accept any numeric dtype and convert.

pub mod npy_text;

use crate::error::{FrameScopeError, Result};
use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A file-backed archive, referenced by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the archive file, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Open the archive for a scoped read.
    pub fn open(&self) -> Result<ArchiveReader> {
        ArchiveReader::open(&self.path)
    }

    /// List array names, opening and closing the archive.
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.open()?.names().to_vec())
    }
}

impl From<&Path> for Archive {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// An open archive. Dropping it closes the file.
pub struct ArchiveReader {
    path: PathBuf,
    npz: NpzReader<File>,
    /// Array names with any `.npy` suffix removed
    names: Vec<String>,
    /// Entry names exactly as stored, parallel to `names`
    entries: Vec<String>,
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("names", &self.names)
            .finish()
    }
}

/// Try each source dtype in turn and convert the first that matches.
macro_rules! read_numeric {
    ($reader:ident, $name:expr, $target:ty, [$($src:ty),+ $(,)?]) => {{
        let entry = $reader.entry($name)?;
        $(
            match $reader.npz.by_name::<OwnedRepr<$src>, IxDyn>(&entry) {
                Ok(array) => return Ok(array.mapv(|v| v as $target)),
                Err(e) if is_wrong_dtype(&e) => {}
                Err(e) => return Err($reader.invalid($name, e)),
            }
        )+
        Err(FrameScopeError::InvalidArray {
            name: $name.to_string(),
            message: "unsupported dtype".to_string(),
        })
    }};
}

fn is_wrong_dtype(err: &ReadNpzError) -> bool {
    matches!(err, ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_)))
}

impl ArchiveReader {
    /// Open an archive and read its directory.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FrameScopeError::archive_access(path, e))?;
        let mut npz = NpzReader::new(file).map_err(|e| FrameScopeError::archive_access(path, e))?;
        let entries = npz
            .names()
            .map_err(|e| FrameScopeError::archive_access(path, e))?;
        let names = entries
            .iter()
            .map(|n| n.strip_suffix(".npy").unwrap_or(n).to_string())
            .collect();
        Ok(Self {
            path: path.to_path_buf(),
            npz,
            names,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Stored entry name for an array name.
    fn entry(&self, name: &str) -> Result<String> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.entries[i].clone())
            .ok_or_else(|| FrameScopeError::MissingArray {
                path: self.path.clone(),
                name: name.to_string(),
            })
    }

    fn invalid(&self, name: &str, err: impl std::fmt::Display) -> FrameScopeError {
        FrameScopeError::InvalidArray {
            name: name.to_string(),
            message: err.to_string(),
        }
    }

    /// Read any numeric array as `f32`.
    pub fn read_f32(&mut self, name: &str) -> Result<ArrayD<f32>> {
        read_numeric!(self, name, f32, [f32, f64, i16, i32, i64, u16, u32, u64, i8, u8])
    }

    /// Read any numeric array as `f64`.
    pub fn read_f64(&mut self, name: &str) -> Result<ArrayD<f64>> {
        read_numeric!(self, name, f64, [f64, f32, i64, i32, i16, u64, u32, u16, i8, u8])
    }

    /// Read any numeric array as `i64`. Floating values are truncated.
    pub fn read_i64(&mut self, name: &str) -> Result<ArrayD<i64>> {
        read_numeric!(self, name, i64, [i64, i32, i16, u32, u16, i8, u8, u64, f64, f32])
    }

    /// Read an entry holding text (byte string, unicode string or `uint8`).
    pub fn read_text(&mut self, name: &str) -> Result<String> {
        let entry = self.entry(name)?;
        let file = File::open(&self.path).map_err(|e| FrameScopeError::archive_access(&self.path, e))?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| FrameScopeError::archive_access(&self.path, e))?;
        let mut raw = Vec::new();
        zip.by_name(&entry)
            .map_err(|e| self.invalid(name, e))?
            .read_to_end(&mut raw)?;
        npy_text::decode_text(&raw).map_err(|e| FrameScopeError::Metadata {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}
