// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each frame is compared against the previous one and only changed cells
// are emitted. Whole unchanged rows are skipped with one slice comparison.
// Output accumulates in a byte buffer and goes to the terminal in a single
// write, wrapped in synchronized-output markers so the terminal never shows
// half a frame.
//
// `StyleWriter` tracks the terminal's cursor position and current SGR state
// so that runs of same-styled, adjacent cells cost one escape sequence, not
// one per cell.

use std::io::{self, Write};

use crate::ansi;
use crate::frame::{Cell, FrameBuffer};
use crate::style::{Attr, Color};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that changed and were emitted.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame.
    pub cells_skipped: usize,
    /// Bytes of ANSI output produced.
    pub bytes_written: usize,
}

// ─── StyleWriter ─────────────────────────────────────────────────────────────

/// Emits cells while skipping redundant cursor moves and SGR codes.
#[allow(clippy::struct_field_names)]
struct StyleWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<Color>,
    last_bg: Option<Color>,
    last_attrs: Attr,
}

impl StyleWriter {
    const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    fn reset_state(&mut self) {
        *self = Self::new();
    }

    fn render_cell(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        if cell.is_continuation() {
            // The wide char just before already covered this column.
            if self.last_y == yi && self.last_x == xi - 1 {
                self.last_x = xi;
                return;
            }
            self.apply_style(out, cell);
            out.push(b' ');
        } else {
            self.apply_style(out, cell);
            let mut enc = [0u8; 4];
            out.extend_from_slice(cell.ch.encode_utf8(&mut enc).as_bytes());
        }
        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_style(&mut self, out: &mut Vec<u8>, cell: &Cell) {
        let style = cell.style;
        if style.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                // SGR 0 drops colors too.
                ansi::reset(out).ok();
                self.last_fg = None;
                self.last_bg = None;
            }
            ansi::attrs(out, style.attrs).ok();
            self.last_attrs = style.attrs;
        }
        if self.last_fg != Some(style.fg) {
            ansi::fg(out, style.fg).ok();
            self.last_fg = Some(style.fg);
        }
        if self.last_bg != Some(style.bg) {
            ansi::bg(out, style.bg).ok();
            self.last_bg = Some(style.bg);
        }
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Renders frames by diffing against the previous one.
///
/// ```no_run
/// use fc_term::diff::DiffRenderer;
/// use fc_term::frame::FrameBuffer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
/// renderer.render(&frame);
/// renderer.flush()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct DiffRenderer {
    output: Vec<u8>,
    writer: StyleWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer whose first frame is a full redraw.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(16 * 1024),
            writer: StyleWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and buffer the ANSI output.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let prev = self
            .previous
            .as_ref()
            .filter(|p| p.width() == width && p.height() == height);
        if prev.is_none() {
            ansi::reset(&mut self.output).ok();
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let Some(row) = current.row(y) else { break };
            let prev_row = prev.and_then(|p| p.row(y));
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                if prev_row.and_then(|r| r.get(usize::from(x))) == Some(cell) {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();
        stats.bytes_written = self.output.len();

        self.store_frame(current);
        stats
    }

    /// The bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write the buffered output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    /// Write the buffered output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.output.is_empty() {
            w.write_all(&self.output)?;
            w.flush()?;
            self.output.clear();
        }
        Ok(())
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
