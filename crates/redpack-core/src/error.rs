//! Error types for RedPack core operations.
//!
//! Errors are grouped by domain and wrapped by the crate-level [`Error`].
//! Component-local failures (one unreadable directory during a walk) are
//! collected as [`IngestError`] values inside a report instead of aborting
//! the enclosing operation. Operation-level failures (an export collision,
//! an unreadable import root) are returned to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in RedPack core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Ingestion could not start or a single-file import was rejected.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Low-level file system failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileSystemError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// Reading a file or listing a directory failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// Target of a create-new write already exists.
    #[error("File already exists: {path}")]
    AlreadyExists {
        /// Existing path.
        path: PathBuf,
    },
}

/// Failures raised while importing samples.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// A directory could not be listed; its subtree was skipped.
    #[error("Skipped unreadable directory {path}: {reason}")]
    UnreadableDirectory {
        /// Directory that could not be read.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A single entry could not be inspected.
    #[error("Skipped unreadable entry {path}: {reason}")]
    UnreadableEntry {
        /// Entry path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The import root is missing or unreadable.
    #[error("Cannot import from {path}: {reason}")]
    InvalidRoot {
        /// Root path passed to the import.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A single-file import named a file with an unsupported extension.
    #[error("Unsupported audio format: {path}")]
    UnsupportedFormat {
        /// Rejected file.
        path: PathBuf,
    },

    /// A built-in kit was requested without a configured bundle root.
    #[error("No sample bundle root configured for kit {kit}")]
    NoBundleRoot {
        /// Requested kit path.
        kit: String,
    },
}

impl IngestError {
    /// Path the failure refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::UnreadableDirectory { path, .. }
            | Self::UnreadableEntry { path, .. }
            | Self::InvalidRoot { path, .. }
            | Self::UnsupportedFormat { path } => Some(path),
            Self::NoBundleRoot { .. } => None,
        }
    }
}

/// Failures reported by a playback backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The backing file no longer exists.
    #[error("Sample file missing: {path}")]
    FileMissing {
        /// Missing file.
        path: PathBuf,
    },

    /// The backend could not decode or start the file.
    #[error("Playback failed for {path}: {reason}")]
    Failed {
        /// File that failed to play.
        path: PathBuf,
        /// Backend reason.
        reason: String,
    },
}

/// Failures raised while exporting a sample.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The destination already holds a file with the sample's name.
    #[error("Export destination already exists: {destination}")]
    Collision {
        /// Path that already exists.
        destination: PathBuf,
    },

    /// The sample's backing file is gone.
    #[error("Sample source missing: {source_path}")]
    SourceMissing {
        /// Missing source file.
        source_path: PathBuf,
    },

    /// The destination could not be written.
    #[error("Cannot write {destination}: {reason}")]
    DestinationUnwritable {
        /// Destination file path.
        destination: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A well-known export directory could not be resolved on this platform.
    #[error("Export target unavailable: {0}")]
    NoTarget(String),

    /// Export of the dragged sample was requested with no drag in progress.
    #[error("No sample is being dragged")]
    NothingDragged,
}

/// Failures for explicit selection requests.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// The filtered view is empty.
    #[error("Nothing to select: the view is empty")]
    Empty,

    /// Index outside the filtered view.
    #[error("Index {index} out of range for view of {len} samples")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Current view length.
        len: usize,
    },
}
