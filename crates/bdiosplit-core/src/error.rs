//! Error types for scan graph splitting.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a [`SplitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input location or limits, detected before processing starts
    Configuration,
    /// Malformed or inconsistent scan graph content
    DataIntegrity,
    /// Filesystem read/write failure
    Io,
}

/// Errors that can occur while loading, partitioning or writing a scan graph.
///
/// Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("input directory '{0}' was not found")]
    InputNotFound(PathBuf),

    #[error("invalid limit '{name}': {message}")]
    InvalidLimit { name: &'static str, message: String },

    #[error("duplicate scan node identity: scanNode-{0}")]
    DuplicateIdentity(u64),

    #[error("scan node scanNode-{0} is referenced but not present in the collection")]
    NotFound(u64),

    #[error("malformed graph node '{id}': {reason}")]
    MalformedNode { id: String, reason: String },

    #[error("header document '{file}' not found in '{dir}'")]
    MissingHeader { dir: PathBuf, file: String },

    #[error("no project record (node without a parent reference) found in the graph")]
    MissingProjectRecord,

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON document '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SplitError {
    /// Create a new MalformedNode error.
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedNode {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidLimit error.
    pub fn invalid_limit(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidLimit {
            name,
            message: message.into(),
        }
    }

    /// Create a new Read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new Write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound(_) | Self::InvalidLimit { .. } => ErrorKind::Configuration,
            Self::DuplicateIdentity(_)
            | Self::NotFound(_)
            | Self::MalformedNode { .. }
            | Self::MissingHeader { .. }
            | Self::MissingProjectRecord
            | Self::Json { .. } => ErrorKind::DataIntegrity,
            Self::Read { .. } | Self::Write { .. } | Self::Serialize { .. } | Self::Walk(_) => {
                ErrorKind::Io
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
