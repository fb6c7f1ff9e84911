//! Document: a text file treated as an ordered list of lines.
//!
//! There is no in-memory buffer. Every read goes to disk and every edit
//! rewrites the whole file, so a committed line is durable the moment the
//! call returns.
//!
//! # Line model
//!
//! - Reading splits on `\n` and drops a `\r` that precedes it, so files
//!   written on Windows still load as clean lines.
//! - Writing joins lines with `\n` and always ends a non-empty document with
//!   a trailing `\n`. An empty line list is written as an empty file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Handle to a note file on disk.
///
/// Cheap to clone: it is only the path. Two handles to the same path see the
/// same content because neither caches anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
}

impl Document {
    /// A handle for `path`. The file does not have to exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without the directory, for titles and messages.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Whether the backing file currently exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    // -- Reading ------------------------------------------------------------

    /// Read the raw file content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read or is not UTF-8.
    pub fn read_text(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(Error::io(&self.path))
    }

    /// Read the raw content for an undo snapshot.
    ///
    /// A missing file snapshots as empty text; restoring it produces an empty
    /// file, which is what the user saw before the first write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] for any failure other than `NotFound`.
    pub fn snapshot(&self) -> Result<String> {
        match self.read_text() {
            Ok(text) => Ok(text),
            Err(e) if e.is_not_found() => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Read the file as lines (see the module docs for the line model).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        self.read_text().map(|text| split_lines(&text))
    }

    /// Number of lines in the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn line_count(&self) -> Result<usize> {
        self.read_lines().map(|lines| lines.len())
    }

    // -- Writing ------------------------------------------------------------

    /// Overwrite the file with `text`, byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails.
    pub fn write_text(&self, text: &str) -> Result<()> {
        fs::write(&self.path, text).map_err(Error::io(&self.path))?;
        debug!(path = %self.path.display(), bytes = text.len(), "document written");
        Ok(())
    }

    /// Overwrite the file with `lines`, joined and newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails.
    pub fn write_lines(&self, lines: &[String]) -> Result<()> {
        self.write_text(&join_lines(lines))
    }
}

// ---------------------------------------------------------------------------
// Line splitting and joining
// ---------------------------------------------------------------------------

/// Split file content into lines.
///
/// A trailing newline does not produce an extra empty line, so
/// `"a\nb\n"` and `"a\nb"` both give `["a", "b"]`.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

/// Join lines into file content, terminating every line with `\n`.
#[must_use]
pub fn join_lines(lines: &[String]) -> String {
    let capacity = lines.iter().map(|l| l.len() + 1).sum();
    let mut out = String::with_capacity(capacity);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
