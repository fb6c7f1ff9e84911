//! Input buffer: the single-line prompt the user types into.
//!
//! The caret is a byte offset that always sits on a grapheme-cluster
//! boundary, so Left/Right/Backspace treat `é` written as `e` + combining
//! accent, or a flag emoji, as one unit. The text never contains a newline:
//! one buffer is one line of the document.

use unicode_segmentation::UnicodeSegmentation;

/// Editable single-line text with a caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    /// Byte offset into `text`, on a grapheme boundary.
    caret: usize,
}

impl InputBuffer {
    /// An empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            caret: 0,
        }
    }

    /// The current text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret position as a byte offset into [`text`](Self::text).
    #[inline]
    #[must_use]
    pub const fn caret(&self) -> usize {
        self.caret
    }

    /// Text to the left of the caret.
    #[must_use]
    pub fn before_caret(&self) -> &str {
        &self.text[..self.caret]
    }

    /// True if no text has been typed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole text and put the caret at the end.
    ///
    /// Line terminators are stripped; the buffer only ever holds one line.
    pub fn set(&mut self, text: &str) {
        self.text.clear();
        self.text
            .extend(text.chars().filter(|c| !matches!(c, '\n' | '\r')));
        self.caret = self.text.len();
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
    }

    /// Take the text out, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.caret = 0;
        std::mem::take(&mut self.text)
    }

    // -- Editing ------------------------------------------------------------

    /// Insert a character at the caret. Newlines are ignored.
    pub fn insert_char(&mut self, ch: char) {
        if matches!(ch, '\n' | '\r') {
            return;
        }
        self.text.insert(self.caret, ch);
        self.caret += ch.len_utf8();
        self.snap_caret();
    }

    /// Insert a string at the caret, flattening any line breaks to spaces.
    pub fn insert_str(&mut self, s: &str) {
        let flat: String = s
            .chars()
            .filter(|&c| c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        self.text.insert_str(self.caret, &flat);
        self.caret += flat.len();
        self.snap_caret();
    }

    /// Delete the grapheme before the caret. Returns `true` if one was
    /// deleted.
    pub fn backspace(&mut self) -> bool {
        let Some(start) = self.prev_boundary() else {
            return false;
        };
        self.text.replace_range(start..self.caret, "");
        self.caret = start;
        true
    }

    /// Delete the grapheme under the caret. Returns `true` if one was
    /// deleted.
    pub fn delete(&mut self) -> bool {
        let Some(end) = self.next_boundary() else {
            return false;
        };
        self.text.replace_range(self.caret..end, "");
        true
    }

    /// Delete from the caret back to the start of the previous word.
    pub fn delete_word_back(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let head = &self.text[..self.caret];
        let start = head
            .split_word_bound_indices()
            .rev()
            .find(|(_, w)| !w.trim().is_empty())
            .map_or(0, |(i, _)| i);
        self.text.replace_range(start..self.caret, "");
        self.caret = start;
        true
    }

    // -- Caret movement -----------------------------------------------------

    /// Move one grapheme left.
    pub fn move_left(&mut self) {
        if let Some(i) = self.prev_boundary() {
            self.caret = i;
        }
    }

    /// Move one grapheme right.
    pub fn move_right(&mut self) {
        if let Some(i) = self.next_boundary() {
            self.caret = i;
        }
    }

    /// Move to the start of the line.
    pub const fn move_home(&mut self) {
        self.caret = 0;
    }

    /// Move past the last character.
    pub fn move_end(&mut self) {
        self.caret = self.text.len();
    }

    // -- Helpers ------------------------------------------------------------

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.caret]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.caret..]
            .graphemes(true)
            .next()
            .map(|g| self.caret + g.len())
    }

    /// Keep the caret on a grapheme boundary after an insert merged clusters
    /// (e.g. a combining mark typed after a letter).
    fn snap_caret(&mut self) {
        let mut snapped = 0;
        for (i, g) in self.text.grapheme_indices(true) {
            let end = i + g.len();
            if end > self.caret {
                break;
            }
            snapped = end;
        }
        if snapped != self.caret && self.caret < self.text.len() {
            self.caret = snapped;
        }
    }
}
