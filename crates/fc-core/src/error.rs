//! Error type shared by every fallible core operation.
//!
//! Storage failures carry the path they happened on so the status line can
//! say which file misbehaved. State errors (`NoCurrentFile`,
//! `NoLineSelected`) are refusals: they are returned before anything is read
//! or written.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can go wrong in the core.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An editing operation was requested with no file open.
    #[error("no file is open, create or open a file first")]
    NoCurrentFile,

    /// A line operation was requested while in append mode.
    #[error("no line selected")]
    NoLineSelected,

    /// `create_file` was asked for a name that is already taken.
    #[error("file already exists: {0}")]
    FileExists(String),

    /// The requested file does not exist in the working directory.
    #[error("no such file: {0}")]
    FileNotFound(String),

    /// A file name that cannot live flat inside the working directory.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    /// The chosen working directory exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The settings file could not be parsed or serialized.
    #[error("settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// No home or config directory could be determined.
    #[error("cannot determine the user's home directory")]
    NoHomeDirectory,
}

/// Result alias used across the core.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a closure that wraps an `io::Error` with `path`.
    ///
    /// Meant for `map_err`: `fs::read_to_string(p).map_err(Error::io(p))`.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for an I/O error whose kind is `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
