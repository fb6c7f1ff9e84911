// SPDX-License-Identifier: MIT
//
// FrameBuffer: the 2D cell grid the shell paints each frame into.
//
// Flat `Vec<Cell>` with row-major indexing, so a row is a contiguous slice
// and the diff renderer can compare whole rows at once.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell holds
// the character; the second is a continuation cell (`ch == '\0'`) that the
// renderer skips when emitting text. Painting over either half of a wide
// character breaks it so no half-glyph is left on screen.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::style::{Color, Style};

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Continuation marker for the second column of a wide character.
const CONTINUATION: char = '\0';

/// One character position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character, or `'\0'` for a continuation cell.
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A space with default colors.
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::PLAIN,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// Whether this is the second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Rect ────────────────────────────────────────────────────────────────────

/// A screen region in cells. Used for layout and clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `(x, y)` lies inside.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by `n` cells on every side.
    #[must_use]
    pub const fn inset(self, n: u16) -> Self {
        let w = self.width.saturating_sub(n.saturating_mul(2));
        let h = self.height.saturating_sub(n.saturating_mul(2));
        Self::new(self.x.saturating_add(n), self.y.saturating_add(n), w, h)
    }

    /// A `width × height` rect centered in this one (clamped to fit).
    #[must_use]
    pub fn centered(self, width: u16, height: u16) -> Self {
        let w = width.min(self.width);
        let h = height.min(self.height);
        Self::new(
            self.x + (self.width - w) / 2,
            self.y + (self.height - h) / 2,
            w,
            h,
        )
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A 2D grid of cells.
///
/// ```
/// use fc_term::frame::FrameBuffer;
/// use fc_term::style::Style;
///
/// let mut buf = FrameBuffer::new(20, 2);
/// let cols = buf.paint_text(0, 0, "C:\\>", Style::PLAIN);
/// assert_eq!(cols, 4);
/// assert_eq!(buf.row_text(0).trim_end(), "C:\\>");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A buffer of empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a [`Rect`].
    #[inline]
    #[must_use]
    pub const fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// The cell at `(x, y)`, or `None` out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// Row `y` as a slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        (y < self.height).then(|| {
            let start = self.index(0, y);
            &self.cells[start..start + usize::from(self.width)]
        })
    }

    /// Characters of row `y` as a string, continuation cells skipped.
    /// Mostly for tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| {
                row.iter()
                    .filter(|c| !c.is_continuation())
                    .map(|c| c.ch)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Clear & Resize ────────────────────────────────────────────────

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Reset every cell to a space with `bg`.
    pub fn clear_with_bg(&mut self, bg: Color) {
        self.cells.fill(Cell::new(' ', Style::PLAIN.bg(bg)));
    }

    /// Resize, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy another buffer of the same size without reallocating.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }

    // ── Painting ──────────────────────────────────────────────────────

    /// Write one cell, breaking any wide character it overlaps.
    /// Returns `false` out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Fill `rect` with spaces in `style`.
    pub fn fill_rect(&mut self, rect: Rect, style: Style) {
        let x2 = rect.right().min(self.width);
        let y2 = rect.bottom().min(self.height);
        for y in rect.y..y2 {
            for x in rect.x..x2 {
                self.set(x, y, Cell::new(' ', style));
            }
        }
    }

    /// Paint `text` left to right from `(x, y)`, stopping at the buffer
    /// edge. Returns the number of columns used.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.paint_clipped(x, y, text, style, self.width)
    }

    /// Paint `text` from `(x, y)`, never touching column `right` or beyond.
    ///
    /// Zero-width characters are skipped. Control characters render as
    /// spaces. A wide character that would straddle the limit is replaced
    /// by a space.
    pub fn paint_clipped(&mut self, x: u16, y: u16, text: &str, style: Style, right: u16) -> u16 {
        let right = right.min(self.width);
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= right {
                break;
            }
            if ch.is_control() {
                self.set(col, y, Cell::new(' ', style));
                col += 1;
                continue;
            }
            let w = ch.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            if w == 2 {
                if col + 1 >= right {
                    self.set(col, y, Cell::new(' ', style));
                    col += 1;
                    break;
                }
                self.set(col, y, Cell::new(ch, style));
                self.set(col + 1, y, Cell::new(CONTINUATION, style));
                col += 2;
            } else {
                self.set(col, y, Cell::new(ch, style));
                col += 1;
            }
        }
        col - x
    }

    /// Break any wide character that touches `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = ' ';
        }
        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next].ch = ' ';
            }
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ────────────────────────────────────────────────────

/// Display width of a string in terminal columns.
///
/// ```
/// use fc_term::frame::string_width;
///
/// assert_eq!(string_width("hello"), 5);
/// assert_eq!(string_width("中文"), 4);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.width()
}

/// The longest prefix of `s` that fits in `max` columns.
#[must_use]
pub fn truncate_to_width(s: &str, max: usize) -> &str {
    let mut used = 0;
    for (i, ch) in s.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            return &s[..i];
        }
        used += w;
    }
    s
}

/// The longest suffix of `s` that fits in `max` columns. Used to keep the
/// caret end of a long input line visible.
#[must_use]
pub fn tail_to_width(s: &str, max: usize) -> &str {
    let mut used = 0;
    for (i, ch) in s.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            return &s[i + ch.len_utf8()..];
        }
        used += w;
    }
    s
}

// ─── Tests ───────────────────────────────────────────────────────────────────
