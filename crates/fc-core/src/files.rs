//! File manager: the flat directory of `.txt` notes.
//!
//! All notes live directly inside one working directory. Names handed in from
//! the UI are normalized (trimmed, `.txt` appended) and must not escape the
//! directory. Which note is open is the line editor's business; the manager
//! only hands out [`Document`] handles.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::document::Document;
use crate::error::{Error, Result};

/// Extension every note carries.
pub const NOTE_EXTENSION: &str = ".txt";

/// The working directory of notes.
#[derive(Debug)]
pub struct FileManager {
    dir: PathBuf,
}

impl FileManager {
    /// Use `dir` as the working directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// [`Error::NotADirectory`] if `dir` exists as something else, or
    /// [`Error::Io`] if it cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        info!(dir = %dir.display(), "file manager ready");
        Ok(Self { dir })
    }

    /// The working directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Switch to another working directory, creating it if needed.
    ///
    /// An open note is unaffected: it is addressed by absolute path.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new). The old directory stays in use on error.
    pub fn update_directory(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        info!(from = %self.dir.display(), to = %dir.display(), "working directory changed");
        self.dir = dir;
        Ok(())
    }

    /// Names of the `.txt` files in the working directory, sorted.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the directory cannot be read.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(Error::io(&self.dir))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(Error::io(&self.dir))?;
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_file && name.ends_with(NOTE_EXTENSION) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Turn user input into a note file name.
    ///
    /// Trims whitespace and appends `.txt` if missing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for empty names, `.`/`..`, or anything with a
    /// path separator.
    pub fn normalize_name(name: &str) -> Result<String> {
        let trimmed = name.trim();
        let stem = trimmed.strip_suffix(NOTE_EXTENSION).unwrap_or(trimmed);
        if stem.is_empty()
            || stem == "."
            || stem == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(Error::InvalidName(name.to_owned()));
        }
        if trimmed.ends_with(NOTE_EXTENSION) {
            Ok(trimmed.to_owned())
        } else {
            Ok(format!("{trimmed}{NOTE_EXTENSION}"))
        }
    }

    /// Create an empty note. Returns its normalized name.
    ///
    /// # Errors
    ///
    /// [`Error::FileExists`] if the name is taken, [`Error::InvalidName`],
    /// or [`Error::Io`].
    pub fn create_file(&self, name: &str) -> Result<String> {
        let name = Self::normalize_name(name)?;
        let path = self.dir.join(&name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                info!(path = %path.display(), "note created");
                Ok(name)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::FileExists(name))
            }
            Err(e) => Err(Error::io(&path)(e)),
        }
    }

    /// Handle to the existing note `name`.
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] if there is no such note, or
    /// [`Error::InvalidName`].
    pub fn open_file(&self, name: &str) -> Result<Document> {
        let name = Self::normalize_name(name)?;
        let doc = Document::new(self.dir.join(&name));
        if !doc.exists() {
            return Err(Error::FileNotFound(name));
        }
        info!(path = %doc.path().display(), "note opened");
        Ok(doc)
    }

    /// Remove a note. Returns the path it had, so the caller can tell
    /// whether it was the open one.
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`], [`Error::InvalidName`] or [`Error::Io`].
    pub fn delete_file(&self, name: &str) -> Result<PathBuf> {
        let name = Self::normalize_name(name)?;
        let path = self.dir.join(&name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound(name));
            }
            Err(e) => return Err(Error::io(&path)(e)),
        }
        info!(path = %path.display(), "note deleted");
        Ok(path)
    }
}

/// Create `dir` (and parents) unless it already is a directory.
fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        warn!(path = %dir.display(), "working directory path is not a directory");
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(Error::io(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn manager() -> (TempDir, FileManager) {
        let dir = TempDir::new().unwrap();
        let fm = FileManager::new(dir.path().join("novels")).unwrap();
        (dir, fm)
    }

    #[test]
    fn new_creates_nested_directory() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("a").join("b");
        let fm = FileManager::new(&target).unwrap();
        assert!(target.is_dir());
        assert_eq!(fm.dir(), target);
    }

    #[test]
    fn new_rejects_a_file_path() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("plain");
        fs::write(&file, "").unwrap();
        assert!(matches!(FileManager::new(&file), Err(Error::NotADirectory(_))));
    }

    #[test]
    fn normalize_appends_extension_and_trims() {
        assert_eq!(FileManager::normalize_name("  story ").unwrap(), "story.txt");
        assert_eq!(FileManager::normalize_name("story.txt").unwrap(), "story.txt");
        assert_eq!(FileManager::normalize_name("v1.2").unwrap(), "v1.2.txt");
    }

    #[test]
    fn normalize_rejects_bad_names() {
        for bad in ["", "   ", ".txt", ".", "..", "../up", "a/b", "a\\b"] {
            assert!(
                matches!(FileManager::normalize_name(bad), Err(Error::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn create_then_list_sorted() {
        let (_root, fm) = manager();
        assert_eq!(fm.create_file("zeta").unwrap(), "zeta.txt");
        fm.create_file("alpha").unwrap();
        fs::write(fm.dir().join("notes.md"), "").unwrap();
        fs::create_dir(fm.dir().join("dir.txt")).unwrap();
        assert_eq!(fm.list_files().unwrap(), vec!["alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn create_duplicate_fails() {
        let (_root, fm) = manager();
        fm.create_file("dup").unwrap();
        assert!(matches!(fm.create_file("dup.txt"), Err(Error::FileExists(n)) if n == "dup.txt"));
    }

    #[test]
    fn open_missing_fails() {
        let (_root, fm) = manager();
        assert!(matches!(fm.open_file("ghost"), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn open_returns_handle_in_working_directory() {
        let (_root, fm) = manager();
        fm.create_file("chapter").unwrap();
        let doc = fm.open_file("chapter").unwrap();
        assert_eq!(doc.name(), "chapter.txt");
        assert_eq!(doc.path(), fm.dir().join("chapter.txt"));
        assert_eq!(doc.read_text().unwrap(), "");
    }

    #[test]
    fn delete_returns_the_removed_path() {
        let (_root, fm) = manager();
        fm.create_file("a").unwrap();
        fm.create_file("b").unwrap();
        let open = fm.open_file("a").unwrap();

        let gone = fm.delete_file("b").unwrap();
        assert_ne!(gone, open.path());
        assert!(open.exists());

        assert_eq!(fm.delete_file("a.txt").unwrap(), open.path());
        assert!(!open.exists());
        assert!(fm.list_files().unwrap().is_empty());
    }

    #[test]
    fn delete_missing_fails() {
        let (_root, fm) = manager();
        assert!(matches!(fm.delete_file("nope"), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn update_directory_leaves_open_handles_alone() {
        let (root, mut fm) = manager();
        fm.create_file("kept").unwrap();
        let doc = fm.open_file("kept").unwrap();
        let other = root.path().join("elsewhere");
        fm.update_directory(&other).unwrap();
        assert!(other.is_dir());
        assert_eq!(fm.dir(), other);
        assert!(doc.exists());
        assert!(fm.list_files().unwrap().is_empty());
    }
}
