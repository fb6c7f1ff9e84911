// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state
// and no decisions about when to emit; the diff renderer's `StyleWriter`
// makes those. Cursor positions are 0-indexed in our API and converted to
// the 1-indexed coordinates the terminal expects.
//
// Besides the usual cursor/color/screen commands, this module knows the
// xterm window operations the shell uses to look like a console window:
// setting the title, iconifying, and resizing to a stored geometry.

use std::io::{self, Write};

use crate::style::{Attr, Color};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Terminal default.
    #[default]
    Default,
    /// Steady block.
    Block,
    /// Blinking underline, the classic console caret.
    BlinkUnderline,
    /// Steady bar.
    Bar,
}

/// Set the cursor shape.
#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    let n: u8 = match shape {
        CursorShape::Default => 0,
        CursorShape::Block => 2,
        CursorShape::BlinkUnderline => 3,
        CursorShape::Bar => 6,
    };
    write!(w, "\x1b[{n} q")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes (SGR 0).
///
/// The renderer must forget its tracked style after calling this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color.
///
/// Palette indices below 16 use the compact 30–37 / 90–97 codes.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Indexed(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        Color::Indexed(idx) if idx < 16 => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        Color::Indexed(idx) => write!(w, "\x1b[38;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
    }
}

/// Set the background color.
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Indexed(idx) if idx < 8 => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
        Color::Indexed(idx) if idx < 16 => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
        Color::Indexed(idx) => write!(w, "\x1b[48;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
    }
}

/// Emit attributes as one CSI sequence, e.g. `\x1b[1;7m`. Nothing for an
/// empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    const CODES: [(Attr, &str); 5] = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::ITALIC, "3"),
        (Attr::UNDERLINE, "4"),
        (Attr::INVERSE, "7"),
    ];
    if attr.is_empty() {
        return Ok(());
    }
    let mut sep = "";
    w.write_all(b"\x1b[")?;
    for (flag, code) in CODES {
        if attr.contains(flag) {
            write!(w, "{sep}{code}")?;
            sep = ";";
        }
    }
    w.write_all(b"m")
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC 2026). The terminal holds the frame until
/// [`end_sync`].
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// Enter the alternate screen (DEC 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen and restore the shell's content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Push Kitty keyboard protocol flags.
///
/// Flag `1` (disambiguate) is what we need: Ctrl+M, Ctrl+H and Esc then
/// arrive as `CSI … u` sequences instead of colliding with Enter,
/// Backspace and the escape-sequence prefix.
#[inline]
pub fn enable_kitty_keyboard(w: &mut impl Write, flags: u8) -> io::Result<()> {
    write!(w, "\x1b[>{flags}u")
}

/// Pop the Kitty keyboard flags pushed by [`enable_kitty_keyboard`].
#[inline]
pub fn disable_kitty_keyboard(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[<u")
}

/// Enable bracketed paste (DEC 2004).
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

/// Disable bracketed paste.
#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

// ─── Window Operations (xterm) ───────────────────────────────────────────────

/// Set the window title (OSC 0). Control characters are dropped so the title
/// can't terminate the sequence early.
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(b"\x1b]0;")?;
    for ch in title.chars().filter(|c| !c.is_control()) {
        let mut enc = [0u8; 4];
        w.write_all(ch.encode_utf8(&mut enc).as_bytes())?;
    }
    w.write_all(b"\x07")
}

/// Ask the window manager to iconify (minimize) the window (`CSI 2 t`).
///
/// Terminals that disallow window ops ignore it.
#[inline]
pub fn iconify_window(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2t")
}

/// Ask for the window to be de-iconified (`CSI 1 t`).
#[inline]
pub fn deiconify_window(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[1t")
}

/// Ask for the text area to be resized to `cols × rows` (`CSI 8 ; r ; c t`).
#[inline]
pub fn resize_window(w: &mut impl Write, cols: u16, rows: u16) -> io::Result<()> {
    write!(w, "\x1b[8;{rows};{cols}t")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
