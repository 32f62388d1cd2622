//! Error handling
//!
//! Typed errors for loading, persisting and synchronizing the songbook,
//! with descriptive messages and recovery suggestions.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::sync::VcsError;

/// Errors that can occur while working with a songbook
#[derive(Error, Debug)]
pub enum Error {
    /// Project root, store directory or manifest is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Manifest exists but cannot be parsed
    #[error("Invalid manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The version-control executable could not be found
    #[error("Git executable not found (tried: {})", .searched.join(", "))]
    ToolUnavailable { searched: Vec<String> },

    /// User input rejected before any change was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Permission denied accessing path
    #[error("Permission denied: cannot {op} '{path}'. Check file permissions.")]
    PermissionDenied {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error("Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again.")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other read/write/delete failure during persist
    #[error("Failed to {op} '{path}': {source}")]
    FileSystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stage, check, commit or push failed after local files were saved
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Filesystem operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Read,
    Write,
    Delete,
    CreateDirectory,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsOp::Read => "read",
            FsOp::Write => "write",
            FsOp::Delete => "delete",
            FsOp::CreateDirectory => "create directory",
        };
        f.write_str(s)
    }
}

/// Invalid field edits coming from the editing surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid number '{0}': the number must be a positive integer")]
    InvalidNumber(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("No song at position {0}")]
    UnknownSong(usize),
}

/// Remote step of the synchronization protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Stage,
    Check,
    Commit,
    Push,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStep::Stage => "stage",
            SyncStep::Check => "check",
            SyncStep::Commit => "commit",
            SyncStep::Push => "push",
        };
        f.write_str(s)
    }
}

/// A failed remote step. Local files were already written and stay written.
#[derive(Error, Debug)]
#[error("Sync failed during {step}: {source}. Local files were saved and not rolled back.")]
pub struct SyncError {
    pub step: SyncStep,
    #[source]
    pub source: VcsError,
}

impl SyncError {
    pub fn new(step: SyncStep, source: VcsError) -> Self {
        Self { step, source }
    }

    /// Always true: a sync error is only raised after the persist step succeeded
    pub fn local_data_safe(&self) -> bool {
        true
    }
}

impl Error {
    /// Create an error from an I/O error with operation and path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(op: FsOp, path: impl Into<PathBuf>, error: io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                op,
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => Error::DiskFull {
                path,
                source: error,
            },
            _ => Error::FileSystem {
                op,
                path,
                source: error,
            },
        }
    }

    /// Check if the caller can retry after fixing the reported cause
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Configuration(_) | Error::ManifestParse { .. } | Error::ToolUnavailable { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::Configuration(_) => Some(
                "Run inside the songbook project (the folder containing songs/index.json) or set `root` in the config file.",
            ),
            Error::ManifestParse { .. } => {
                Some("Fix the JSON in songs/index.json, for example by restoring it from git.")
            }
            Error::ToolUnavailable { .. } => {
                Some("Install git or set `git_path` in the config file.")
            }
            Error::DiskFull { .. } => Some("Free up disk space and try again."),
            Error::PermissionDenied { .. } => {
                Some("Check file and directory permissions of the songs folder.")
            }
            Error::Sync(_) => Some(
                "Local files are saved. Check the git remote and credentials, then run `cancionero sync`.",
            ),
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for songbook operations
pub type Result<T> = std::result::Result<T, Error>;
