//! Error handling for FrameScope
//!
//! This module defines the crate error type and a Result alias used by the
//! archive readers, the sources and the source manager.
//!
//! Failures never abort the process: inventory construction skips the
//! offending archive, and generation failures leave the manager's cache
//! untouched while the error is reported back to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for FrameScope operations
#[derive(Error, Debug)]
pub enum FrameScopeError {
    /// Archive file missing or not a readable `.npz`
    #[error("Cannot access archive {path:?}: {message}")]
    ArchiveAccess { path: PathBuf, message: String },

    /// The first archive of a file set matches no known naming grammar
    #[error("No recognized naming grammar in archive {path:?}")]
    SchemaMismatch { path: PathBuf },

    /// A frame-grammar index lacks one of its three co-indexed arrays
    #[error("Incomplete triple for tag {tag:?} index {index} in {path:?}")]
    IncompleteTriple {
        path: PathBuf,
        tag: String,
        index: u64,
    },

    /// Positional access outside an inventory
    #[error("Index {index} out of range (inventory length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A named array is not present in the archive
    #[error("Array {name:?} not found in {path:?}")]
    MissingArray { path: PathBuf, name: String },

    /// An array is present but has an unusable dtype or shape
    #[error("Invalid array {name:?}: {message}")]
    InvalidArray { name: String, message: String },

    /// Sidecar metadata could not be decoded
    #[error("Metadata error in {name:?}: {message}")]
    Metadata { name: String, message: String },

    /// A file set with no archives at all
    #[error("No archives given for source")]
    NoArchives,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<FrameScopeError>,
    },
}

impl FrameScopeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FrameScopeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build an archive access error from any displayable cause
    pub fn archive_access(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        FrameScopeError::ArchiveAccess {
            path: path.into(),
            message: cause.to_string(),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &FrameScopeError {
        match self {
            FrameScopeError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for positional access past the end of an inventory
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.root(), FrameScopeError::IndexOutOfRange { .. })
    }
}

/// Result type alias for FrameScope operations
pub type Result<T> = std::result::Result<T, FrameScopeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
