//! # fc-core: Line-editing core for fake-console
//!
//! Everything that touches the user's notes lives here, free of any terminal
//! code:
//!
//! - **[`document`]**: `Document`, a `.txt` file read and rewritten as lines
//! - **[`undo`]**: `UndoStack`, a bounded LIFO of whole-file snapshots
//! - **[`input`]**: `InputBuffer`, the single-line prompt with a grapheme caret
//! - **[`editor`]**: `LineEditor`, the session that edits one line at a time
//! - **[`files`]**: `FileManager`, the flat directory of notes
//! - **[`settings`]**: `Settings`, persisted geometry, directory and shortcuts
//! - **[`report`]**: `Report`, leveled status messages for the shell
//! - **[`autosave`]**: `AutoSave`, the periodic save timer
//!
//! The shell drives a [`LineEditor`] with plain method calls. Each call runs to
//! completion and returns a [`Result`]; no error is fatal to the process.

pub mod autosave;
pub mod document;
pub mod editor;
pub mod error;
pub mod files;
pub mod input;
pub mod report;
pub mod settings;
pub mod undo;

pub use document::Document;
pub use editor::{Cursor, LineChange, LineEditor, Placeholder, UndoOutcome};
pub use error::{Error, Result};
pub use files::FileManager;
pub use report::{Level, Report};
pub use settings::{Settings, Shortcut};
pub use undo::UndoStack;
