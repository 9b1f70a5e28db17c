//! Error types for the backing store and its line format.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing the backing file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file (or its temporary sibling) could not be opened.
    #[error("unable to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// The backing file was opened but reading it failed.
    #[error("failed reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// Writing, syncing or renaming into place failed.
    #[error("failed writing {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The last load failed, so the file on disk may hold tasks that are
    /// not in memory.
    #[error("refusing to overwrite {}: it could not be loaded", .path.display())]
    LoadFailed { path: PathBuf },

    /// Every task id has been handed out.
    #[error("no task ids left to allocate")]
    IdsExhausted,
}

/// Reasons a persisted line cannot be turned back into a task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 6 fields, found {found}")]
    FieldCount { found: usize },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid due date '{0}'")]
    InvalidDueDate(String),
}
