//! Line editor: edit a note one line at a time, with bounded undo.
//!
//! A [`LineEditor`] is the editing session for the open note. It owns:
//!
//! - the [`Document`] being edited (if any),
//! - the [`Cursor`]: an existing line, or append mode,
//! - the [`InputBuffer`] the user types into,
//! - the [`UndoStack`] of whole-file snapshots.
//!
//! # Storage discipline
//!
//! Nothing is cached. Every operation reads the current lines from disk,
//! applies one change, and rewrites the whole file. Before any write the
//! previous content is pushed onto the undo stack; if the write fails the
//! snapshot is popped again, so the stack only ever holds states the file
//! really had.
//!
//! # Cursor model
//!
//! The cursor is an index, not an anchor. Deleting line `i` keeps the cursor
//! at `i`, which now names the line that used to be `i + 1`. If that runs
//! past the end, the cursor falls back to append mode.

use tracing::{debug, info};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::input::InputBuffer;
use crate::undo::UndoStack;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Which line the input is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Editing the existing line at this 0-based index.
    Line(usize),
    /// No line selected: the next save adds a new last line.
    Append,
}

impl Cursor {
    /// The line index, or `None` in append mode.
    #[must_use]
    pub const fn line(self) -> Option<usize> {
        match self {
            Self::Line(n) => Some(n),
            Self::Append => None,
        }
    }

    /// True in append mode.
    #[must_use]
    pub const fn is_append(self) -> bool {
        matches!(self, Self::Append)
    }

    /// Numeric position used for navigation: append mode sits just past the
    /// last line.
    const fn index(self, line_count: usize) -> usize {
        match self {
            Self::Line(n) => n,
            Self::Append => line_count,
        }
    }
}

/// Hint shown in the prompt while the input is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// No note is open.
    NoFile,
    /// Append mode: typing adds new content.
    NewContent,
    /// Editing an existing line (0-based).
    Line(usize),
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a save did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new last line was added at this index.
    Appended(usize),
    /// The line at this index was rewritten.
    Replaced(usize),
    /// The line at this index was removed.
    Deleted(usize),
    /// Nothing needed writing.
    Unchanged,
}

impl LineChange {
    /// True if the file was written.
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Result of an undo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// A snapshot was written back. `remaining` snapshots are left.
    Restored { remaining: usize },
    /// The stack was empty; nothing changed.
    NothingToUndo,
}

// ---------------------------------------------------------------------------
// LineEditor
// ---------------------------------------------------------------------------

/// Editing session for one note.
#[derive(Debug)]
pub struct LineEditor {
    document: Option<Document>,
    cursor: Cursor,
    input: InputBuffer,
    undo: UndoStack,
}

impl LineEditor {
    /// A session with no note open.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: None,
            cursor: Cursor::Append,
            input: InputBuffer::new(),
            undo: UndoStack::new(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The open note, if any.
    #[must_use]
    pub const fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Where the input is bound.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The prompt text.
    #[must_use]
    pub const fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// The prompt text, for keystroke editing.
    pub const fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    /// The undo history.
    #[must_use]
    pub const fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    /// Hint for the empty prompt.
    #[must_use]
    pub const fn placeholder(&self) -> Placeholder {
        match (&self.document, self.cursor) {
            (None, _) => Placeholder::NoFile,
            (Some(_), Cursor::Append) => Placeholder::NewContent,
            (Some(_), Cursor::Line(n)) => Placeholder::Line(n),
        }
    }

    // -- Session lifecycle --------------------------------------------------

    /// Start editing `document`.
    ///
    /// History belongs to a single file, so the undo stack is cleared. The
    /// session starts in append mode with an empty prompt.
    pub fn open(&mut self, document: Document) {
        info!(path = %document.path().display(), "editing session opened");
        self.document = Some(document);
        self.undo.clear();
        self.cursor = Cursor::Append;
        self.input.clear();
    }

    /// Stop editing. Used when the open note is deleted.
    pub fn close(&mut self) {
        if let Some(doc) = self.document.take() {
            info!(path = %doc.path().display(), "editing session closed");
        }
        self.undo.clear();
        self.cursor = Cursor::Append;
        self.input.clear();
    }

    // -- Core operations ----------------------------------------------------

    /// Point the cursor at line `n` and load it into the prompt.
    ///
    /// If `n` is at or past the end the session enters append mode and the
    /// prompt is cleared.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentFile`] with no note open, or [`Error::Io`] if the
    /// note cannot be read. State is left unchanged on error.
    pub fn move_to_line(&mut self, n: usize) -> Result<()> {
        let lines = self.require_document()?.read_lines()?;
        match lines.get(n) {
            Some(line) => {
                self.cursor = Cursor::Line(n);
                self.input.set(line);
            }
            None => {
                self.cursor = Cursor::Append;
                self.input.clear();
            }
        }
        debug!(cursor = ?self.cursor, lines = lines.len(), "moved to line");
        Ok(())
    }

    /// Commit `text` at the cursor.
    ///
    /// | Cursor    | `text`    | Effect                         |
    /// |-----------|-----------|--------------------------------|
    /// | Append    | non-empty | new last line                  |
    /// | Append    | empty     | nothing                        |
    /// | `Line(i)` | non-empty | line `i` replaced              |
    /// | `Line(i)` | empty     | line `i` deleted               |
    ///
    /// The prompt is not touched. After a deletion that leaves the cursor
    /// past the end, the cursor becomes append mode.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentFile`] with no note open, or [`Error::Io`] if the
    /// note cannot be read or written.
    pub fn save_current_line(&mut self, text: &str) -> Result<LineChange> {
        let doc = self.require_document()?.clone();
        let mut lines = match doc.read_lines() {
            Ok(lines) => lines,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };

        let change = match self.cursor {
            Cursor::Append if text.is_empty() => return Ok(LineChange::Unchanged),
            Cursor::Append => {
                lines.push(text.to_owned());
                LineChange::Appended(lines.len() - 1)
            }
            Cursor::Line(i) if i >= lines.len() => {
                // The file shrank underneath us; treat it like append mode.
                self.cursor = Cursor::Append;
                if text.is_empty() {
                    return Ok(LineChange::Unchanged);
                }
                lines.push(text.to_owned());
                LineChange::Appended(lines.len() - 1)
            }
            Cursor::Line(i) if text.is_empty() => {
                lines.remove(i);
                LineChange::Deleted(i)
            }
            Cursor::Line(i) => {
                text.clone_into(&mut lines[i]);
                LineChange::Replaced(i)
            }
        };

        self.commit(&doc, &lines)?;

        if let LineChange::Deleted(i) = change {
            if i >= lines.len() {
                self.cursor = Cursor::Append;
            }
        }
        debug!(?change, "line saved");
        Ok(change)
    }

    /// Commit the prompt and advance.
    ///
    /// Saves the prompt at the cursor, clears it, and if the cursor was on
    /// an existing line moves to the next one. In append mode the session
    /// stays in append mode, ready for the next line.
    ///
    /// # Errors
    ///
    /// As [`save_current_line`](Self::save_current_line) and
    /// [`move_to_line`](Self::move_to_line).
    pub fn process_enter(&mut self) -> Result<LineChange> {
        let was = self.cursor;
        let text = self.input.text().to_owned();
        let change = self.save_current_line(&text)?;
        self.input.clear();
        if let Cursor::Line(i) = was {
            self.move_to_line(i + 1)?;
        }
        Ok(change)
    }

    /// Commit the prompt, then select the previous line.
    ///
    /// From append mode this selects the last line.
    ///
    /// # Errors
    ///
    /// As [`save_current_line`](Self::save_current_line) and
    /// [`move_to_line`](Self::move_to_line).
    pub fn navigate_up(&mut self) -> Result<LineChange> {
        let text = self.input.text().to_owned();
        let change = self.save_current_line(&text)?;
        if change.is_write() && self.cursor.is_append() {
            // An append landed; the prompt already lives in the file.
            self.input.clear();
        }
        let count = self.require_document()?.line_count()?;
        let target = self.cursor.index(count).saturating_sub(1);
        self.move_to_line(target)?;
        Ok(change)
    }

    /// Commit the prompt, then select line `i + 1`.
    ///
    /// The target index is fixed before the commit, so clearing a line and
    /// moving down skips the line that slid into its place, the same as
    /// Enter. In append mode there is nothing below, so this does nothing.
    ///
    /// # Errors
    ///
    /// As [`save_current_line`](Self::save_current_line) and
    /// [`move_to_line`](Self::move_to_line).
    pub fn navigate_down(&mut self) -> Result<LineChange> {
        let Cursor::Line(i) = self.cursor else {
            self.require_document()?;
            return Ok(LineChange::Unchanged);
        };
        let text = self.input.text().to_owned();
        let change = self.save_current_line(&text)?;
        self.move_to_line(i + 1)?;
        Ok(change)
    }

    /// Remove the selected line and select whatever now sits at its index.
    ///
    /// # Errors
    ///
    /// [`Error::NoLineSelected`] in append mode, [`Error::NoCurrentFile`]
    /// with no note open, or [`Error::Io`].
    pub fn delete_current_line(&mut self) -> Result<usize> {
        let doc = self.require_document()?.clone();
        let Cursor::Line(i) = self.cursor else {
            return Err(Error::NoLineSelected);
        };
        let mut lines = doc.read_lines()?;
        if i >= lines.len() {
            self.cursor = Cursor::Append;
            self.input.clear();
            return Err(Error::NoLineSelected);
        }
        lines.remove(i);
        self.commit(&doc, &lines)?;
        self.move_to_line(i)?;
        info!(line = i, "line deleted");
        Ok(i)
    }

    /// Restore the newest snapshot.
    ///
    /// The whole file reverts to the snapshot; there is no redo. The cursor
    /// is then re-derived from the restored content: a line still in range
    /// is reloaded into the prompt, one past the end becomes append mode,
    /// and append mode keeps whatever was typed.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentFile`] with no note open, or [`Error::Io`] if the
    /// snapshot cannot be written (the snapshot is kept in that case).
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        let doc = self.require_document()?.clone();
        let Some(snapshot) = self.undo.pop() else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        if let Err(e) = doc.write_text(&snapshot) {
            self.undo.push(snapshot);
            return Err(e);
        }
        info!(remaining = self.undo.len(), "undo restored snapshot");

        if let Cursor::Line(i) = self.cursor {
            self.move_to_line(i)?;
        }
        Ok(UndoOutcome::Restored {
            remaining: self.undo.len(),
        })
    }

    // -- Save paths ---------------------------------------------------------

    /// Manual save and auto-save.
    ///
    /// Commits a non-empty prompt at the cursor. An append clears the prompt
    /// so that a later save cannot add the same text twice. An empty prompt
    /// is never committed here, so a timer can't delete a line.
    ///
    /// # Errors
    ///
    /// As [`save_current_line`](Self::save_current_line).
    pub fn save(&mut self) -> Result<LineChange> {
        self.require_document()?;
        if self.input.is_empty() {
            return Ok(LineChange::Unchanged);
        }
        let text = self.input.text().to_owned();
        let change = self.save_current_line(&text)?;
        if let LineChange::Appended(_) = change {
            self.input.clear();
        }
        Ok(change)
    }

    /// Append several lines with a single undo step (multi-line paste).
    ///
    /// Returns how many lines were added.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentFile`] with no note open, or [`Error::Io`].
    pub fn append_lines<S: AsRef<str>>(&mut self, new_lines: &[S]) -> Result<usize> {
        let doc = self.require_document()?.clone();
        if new_lines.is_empty() {
            return Ok(0);
        }
        let mut lines = match doc.read_lines() {
            Ok(lines) => lines,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };
        lines.extend(new_lines.iter().map(|l| l.as_ref().to_owned()));
        self.commit(&doc, &lines)?;
        Ok(new_lines.len())
    }

    // -- Internals ----------------------------------------------------------

    fn require_document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(Error::NoCurrentFile)
    }

    /// Snapshot, then write `lines`. The snapshot is dropped if the write
    /// fails.
    fn commit(&mut self, doc: &Document, lines: &[String]) -> Result<()> {
        let before = doc.snapshot()?;
        if self.undo.push(before).is_some() {
            debug!(limit = self.undo.limit(), "oldest undo snapshot evicted");
        }
        if let Err(e) = doc.write_lines(lines) {
            self.undo.pop();
            return Err(e);
        }
        Ok(())
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
