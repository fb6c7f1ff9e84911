//! Settings store: small persisted key/value state.
//!
//! Stored as pretty JSON at `<config_dir>/fake-console/settings.json`. Every
//! setter writes the file straight away, so nothing is lost if the process
//! dies. Unset keys read back as their defaults.
//!
//! Shortcuts are kept as chord strings (`"Ctrl+S"`, `"Esc"`). This crate
//! doesn't parse them; the shell does.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "fake-console";

/// File name of the settings file.
pub const SETTINGS_FILE: &str = "settings.json";

// ---------------------------------------------------------------------------
// Shortcut actions
// ---------------------------------------------------------------------------

/// A rebindable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shortcut {
    Close,
    Minimize,
    ToggleToolbar,
    Save,
    ShowContent,
    Undo,
    CloseEditor,
}

impl Shortcut {
    /// Every action, in display order.
    pub const ALL: [Self; 7] = [
        Self::Close,
        Self::Minimize,
        Self::ToggleToolbar,
        Self::Save,
        Self::ShowContent,
        Self::Undo,
        Self::CloseEditor,
    ];

    /// Key used in the settings file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Minimize => "minimize",
            Self::ToggleToolbar => "toggle_toolbar",
            Self::Save => "save",
            Self::ShowContent => "show_content",
            Self::Undo => "undo",
            Self::CloseEditor => "close_editor",
        }
    }

    /// Look up an action by its settings key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Chord bound when nothing is stored.
    #[must_use]
    pub const fn default_chord(self) -> &'static str {
        match self {
            Self::Close => "Ctrl+Q",
            Self::Minimize => "Ctrl+M",
            Self::ToggleToolbar => "Ctrl+B",
            Self::Save => "Ctrl+S",
            Self::ShowContent => "Ctrl+R",
            Self::Undo => "Ctrl+Z",
            Self::CloseEditor => "Esc",
        }
    }

    /// Human label for dialogs and help.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Close => "Exit",
            Self::Minimize => "Minimize window",
            Self::ToggleToolbar => "Show/hide toolbar",
            Self::Save => "Save input",
            Self::ShowContent => "Show file content",
            Self::Undo => "Undo last change",
            Self::CloseEditor => "Close content panel",
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Stored values
// ---------------------------------------------------------------------------

/// On-disk shape. Every field is optional so older or hand-edited files load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct Values {
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    novel_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    show_status: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    shortcuts: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Persisted application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backing file; `None` keeps everything in memory.
    path: Option<PathBuf>,
    values: Values,
}

impl Settings {
    /// Default location of the settings file.
    ///
    /// # Errors
    ///
    /// [`Error::NoHomeDirectory`] if the platform has no config directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
            .ok_or(Error::NoHomeDirectory)
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// As [`default_path`](Self::default_path) and [`open`](Self::open).
    pub fn load() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Load from `path`. A missing file gives defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file exists but cannot be read, or
    /// [`Error::Settings`] if it is not valid JSON.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Values::default(),
            Err(e) => return Err(Error::io(&path)(e)),
        };
        debug!(path = %path.display(), "settings loaded");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Defaults bound to `path`, ignoring whatever is there now. The next
    /// setter overwrites the file.
    #[must_use]
    pub fn defaults_at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            values: Values::default(),
        }
    }

    /// Settings that never touch the disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Values::default(),
        }
    }

    /// The backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // -- Geometry -----------------------------------------------------------

    /// Stored window geometry, opaque to this crate.
    #[must_use]
    pub fn geometry(&self) -> Option<&str> {
        self.values.geometry.as_deref()
    }

    /// Store the window geometry.
    ///
    /// # Errors
    ///
    /// As [`persist`](Self::persist).
    pub fn set_geometry(&mut self, geometry: impl Into<String>) -> Result<()> {
        self.values.geometry = Some(geometry.into());
        self.persist()
    }

    // -- Directory ----------------------------------------------------------

    /// Where notes live. Defaults to `~/novels`.
    #[must_use]
    pub fn novel_directory(&self) -> PathBuf {
        self.values
            .novel_directory
            .clone()
            .unwrap_or_else(default_novel_directory)
    }

    /// Store the notes directory.
    ///
    /// # Errors
    ///
    /// As [`persist`](Self::persist).
    pub fn set_novel_directory(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        self.values.novel_directory = Some(dir.into());
        self.persist()
    }

    // -- Status line --------------------------------------------------------

    /// Whether the status line is shown. Defaults to `true`.
    #[must_use]
    pub fn show_status(&self) -> bool {
        self.values.show_status.unwrap_or(true)
    }

    /// Store the status line flag.
    ///
    /// # Errors
    ///
    /// As [`persist`](Self::persist).
    pub fn set_show_status(&mut self, show: bool) -> Result<()> {
        self.values.show_status = Some(show);
        self.persist()
    }

    // -- Shortcuts ----------------------------------------------------------

    /// The chord bound to `action`, or its default.
    #[must_use]
    pub fn shortcut(&self, action: Shortcut) -> &str {
        self.values
            .shortcuts
            .get(action.name())
            .map_or_else(|| action.default_chord(), String::as_str)
    }

    /// Bind `action` to `chord`. Duplicate chords across actions are allowed.
    ///
    /// # Errors
    ///
    /// As [`persist`](Self::persist).
    pub fn set_shortcut(&mut self, action: Shortcut, chord: impl Into<String>) -> Result<()> {
        let chord = chord.into();
        info!(action = action.name(), %chord, "shortcut rebound");
        self.values.shortcuts.insert(action.name().to_owned(), chord);
        self.persist()
    }

    /// Write the default table back for every action.
    ///
    /// # Errors
    ///
    /// As [`persist`](Self::persist).
    pub fn reset_shortcuts(&mut self) -> Result<()> {
        for action in Shortcut::ALL {
            self.values
                .shortcuts
                .insert(action.name().to_owned(), action.default_chord().to_owned());
        }
        info!("shortcuts reset to defaults");
        self.persist()
    }

    // -- Persistence --------------------------------------------------------

    /// Write the current values to the backing file, creating its directory.
    /// Does nothing for in-memory settings.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be written.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(Error::io(dir))?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, json).map_err(Error::io(path))?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

fn default_novel_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("novels")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_unset() {
        let s = Settings::in_memory();
        assert_eq!(s.geometry(), None);
        assert!(s.show_status());
        assert!(s.novel_directory().ends_with("novels"));
        for action in Shortcut::ALL {
            assert_eq!(s.shortcut(action), action.default_chord());
        }
    }

    #[test]
    fn default_table() {
        let table: Vec<_> = Shortcut::ALL
            .iter()
            .map(|a| (a.name(), a.default_chord()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("close", "Ctrl+Q"),
                ("minimize", "Ctrl+M"),
                ("toggle_toolbar", "Ctrl+B"),
                ("save", "Ctrl+S"),
                ("show_content", "Ctrl+R"),
                ("undo", "Ctrl+Z"),
                ("close_editor", "Esc"),
            ]
        );
    }

    #[test]
    fn from_name_round_trips() {
        for action in Shortcut::ALL {
            assert_eq!(Shortcut::from_name(action.name()), Some(action));
        }
        assert_eq!(Shortcut::from_name("launch_rockets"), None);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let s = Settings::open(dir.path().join("settings.json")).unwrap();
        assert!(s.show_status());
        assert_eq!(s.shortcut(Shortcut::Save), "Ctrl+S");
    }

    #[test]
    fn setters_persist_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut s = Settings::open(&path).unwrap();
        s.set_geometry("120x40").unwrap();
        s.set_novel_directory("/tmp/notes").unwrap();
        s.set_show_status(false).unwrap();
        s.set_shortcut(Shortcut::Save, "Ctrl+W").unwrap();

        let reloaded = Settings::open(&path).unwrap();
        assert_eq!(reloaded.geometry(), Some("120x40"));
        assert_eq!(reloaded.novel_directory(), PathBuf::from("/tmp/notes"));
        assert!(!reloaded.show_status());
        assert_eq!(reloaded.shortcut(Shortcut::Save), "Ctrl+W");
        assert_eq!(reloaded.shortcut(Shortcut::Undo), "Ctrl+Z");
    }

    #[test]
    fn reset_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = Settings::open(&path).unwrap();
        s.set_shortcut(Shortcut::Close, "Ctrl+X").unwrap();
        s.reset_shortcuts().unwrap();
        assert_eq!(s.shortcut(Shortcut::Close), "Ctrl+Q");
        let reloaded = Settings::open(&path).unwrap();
        assert_eq!(reloaded.shortcut(Shortcut::Close), "Ctrl+Q");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::open(&path), Err(Error::Settings(_))));
    }

    #[test]
    fn partial_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "shortcuts": { "undo": "Ctrl+U" } }"#).unwrap();
        let s = Settings::open(&path).unwrap();
        assert_eq!(s.shortcut(Shortcut::Undo), "Ctrl+U");
        assert!(s.show_status());
    }

    #[test]
    fn in_memory_never_writes() {
        let mut s = Settings::in_memory();
        s.set_show_status(false).unwrap();
        assert!(!s.show_status());
        assert!(s.path().is_none());
    }
}
