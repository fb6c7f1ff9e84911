// SPDX-License-Identifier: MIT
//
// Painting the console into a frame buffer.
//
//   ┌──────────┬──────────────────────────────┐
//   │ toolbar  │ scrollback       ┌─────────┐ │
//   │ (notes)  │                  │ content │ │
//   │          │                  │ panel   │ │
//   │          │ [12:00:01] [SUCCESS] saved │ │  status
//   │          │ C:\Users\me>typed text_    │ │  prompt
//   └──────────┴──────────────────────────────┘
//
// Dialogs are drawn last, centered over everything. The screen cursor goes
// to the caret of whichever text field has focus.

use fc_core::input::InputBuffer;
use fc_core::{Level, Placeholder, Shortcut};
use fc_term::frame::{FrameBuffer, Rect, tail_to_width};
use fc_term::style::{Attr, Color, Style};

use super::{FakeConsole, Focus};
use crate::dialogs::{Dialog, SettingsField};

// ─── Palette ─────────────────────────────────────────────────────────────────

const BG: Color = Color::BLACK;
const TEXT: Color = Color::from_u32(0xCCCCCC);
const DIM: Color = Color::from_u32(0x767676);
const STATUS: Color = Color::from_u32(0x00FF00);

const TOOLBAR_BG: Color = Color::from_u32(0x252526);
const BUTTON_BG: Color = Color::from_u32(0x333333);
const SELECTED_BG: Color = Color::from_u32(0x094771);
const HOVER_BG: Color = Color::from_u32(0x2A2D2E);

const PANEL_BG: Color = Color::from_u32(0x1E1E1E);
const PANEL_FG: Color = Color::from_u32(0xD4D4D4);
const CURSOR_LINE_BG: Color = Color::from_u32(0x264F78);

const TOOLBAR_WIDTH: u16 = 28;
/// Narrower than this and the toolbar is not drawn.
const TOOLBAR_MIN_SCREEN: u16 = 40;

const fn level_color(level: Option<Level>) -> Color {
    match level {
        Some(Level::Error) => Color::from_u32(0xFF5555),
        Some(Level::Warning) => Color::from_u32(0xFFB86C),
        Some(Level::Success) => Color::from_u32(0x50FA7B),
        Some(Level::Info) => Color::from_u32(0x8BE9FD),
        None => Color::from_u32(0xF8F8F2),
    }
}

impl FakeConsole {
    pub(super) fn paint_frame(&mut self, frame: &mut FrameBuffer) {
        self.cursor_screen = None;
        frame.clear_with_bg(BG);
        let (w, h) = (frame.width(), frame.height());
        if w == 0 || h == 0 {
            return;
        }

        let left = if self.toolbar_visible && w >= TOOLBAR_MIN_SCREEN {
            self.paint_toolbar(frame, Rect::new(0, 0, TOOLBAR_WIDTH, h));
            TOOLBAR_WIDTH + 1
        } else {
            0
        };

        let prompt_y = h - 1;
        let show_status = self.settings.show_status() && !self.status_line.is_empty();
        let console_h = if show_status { prompt_y.saturating_sub(1) } else { prompt_y };

        self.paint_scrollback(frame, Rect::new(left, 0, w - left, console_h));
        if show_status {
            // Problems keep their level color; everything else is console green.
            let fg = match self.status.as_ref().map(|r| r.level) {
                Some(level @ (Level::Error | Level::Warning)) => level_color(Some(level)),
                _ => STATUS,
            };
            frame.paint_text(left, console_h, &self.status_line, Style::new(fg, BG));
        }
        self.paint_prompt(frame, left, prompt_y);

        if let Some(lines) = &self.panel {
            let panel_w = (w.saturating_sub(left) / 2).max(30).min(w - left);
            self.paint_panel(frame, lines, Rect::new(w - panel_w, 0, panel_w, console_h));
        }
        if self.dialog.is_some() {
            self.paint_dialog(frame);
        }
    }

    // ── Toolbar ─────────────────────────────────────────────────────

    fn paint_toolbar(&self, frame: &mut FrameBuffer, area: Rect) {
        frame.fill_rect(area, Style::new(TEXT, TOOLBAR_BG));
        let right = area.right();

        let mut x = area.x + 1;
        for label in ["New", "Delete", "Refresh"] {
            let style = Style::new(TEXT, BUTTON_BG);
            let used = frame.paint_clipped(x, 0, &format!(" {label} "), style, right);
            x += used + 1;
        }

        let focused = self.focus == Focus::Browser;
        let title = Style::new(if focused { Color::WHITE } else { DIM }, TOOLBAR_BG);
        frame.paint_clipped(area.x + 1, 2, "NOTES", title.with(Attr::BOLD), right);

        let current = self.current_name();
        let first_row = 3;
        let rows = area.height.saturating_sub(first_row + 1) as usize;
        let top = self.selected.saturating_sub(rows.saturating_sub(1));
        for (i, name) in self.browser.iter().enumerate().skip(top).take(rows) {
            #[allow(clippy::cast_possible_truncation)]
            let y = first_row + (i - top) as u16;
            let bg = match (i == self.selected, focused) {
                (true, true) => SELECTED_BG,
                (true, false) => HOVER_BG,
                _ => TOOLBAR_BG,
            };
            let style = Style::new(TEXT, bg);
            frame.fill_rect(Rect::new(area.x, y, area.width, 1), style);
            let marker = if current.as_deref() == Some(name.as_str()) { "● " } else { "  " };
            frame.paint_clipped(area.x + 1, y, &format!("{marker}{name}"), style, right);
        }
        if self.browser.is_empty() {
            let style = Style::new(DIM, TOOLBAR_BG);
            frame.paint_clipped(area.x + 3, first_row, "(no notes)", style, right);
        }

        let hint = if focused { "n new  d delete  r refresh" } else { "Tab to browse" };
        frame.paint_clipped(area.x + 1, area.bottom() - 1, hint, Style::new(DIM, TOOLBAR_BG), right);
    }

    // ── Console ─────────────────────────────────────────────────────

    fn paint_scrollback(&self, frame: &mut FrameBuffer, area: Rect) {
        if area.is_empty() || self.scrollback.is_empty() {
            return;
        }
        let count = self.scrollback.len().min(area.height as usize);
        #[allow(clippy::cast_possible_truncation)]
        let mut y = area.bottom() - count as u16;
        for line in self.scrollback.tail(count) {
            let style = Style::new(level_color(line.level), BG);
            frame.paint_clipped(area.x, y, &line.text, style, area.right());
            y += 1;
        }
    }

    fn paint_prompt(&mut self, frame: &mut FrameBuffer, x: u16, y: u16) {
        let right = frame.width();
        let prefix = format!(r"C:\Users\{}>", self.user);
        let x = x + frame.paint_clipped(x, y, &prefix, Style::new(TEXT, BG), right);

        let input = self.editor.input();
        if input.is_empty() {
            let hint = match self.editor.placeholder() {
                Placeholder::NoFile => "create or open a file first (Ctrl+N), press Ctrl+H for help".to_owned(),
                Placeholder::NewContent => "new line, press Ctrl+H for help".to_owned(),
                Placeholder::Line(n) => format!("line {} is empty", n + 1),
            };
            frame.paint_clipped(x, y, &hint, Style::new(DIM, BG).with(Attr::ITALIC), right);
            if self.focus == Focus::Prompt {
                self.cursor_screen = Some((x, y));
            }
            return;
        }
        let caret = paint_input(frame, input, x, y, right, Style::new(TEXT, BG));
        if self.focus == Focus::Prompt {
            self.cursor_screen = Some((caret, y));
        }
    }

    // ── Content panel ───────────────────────────────────────────────

    fn paint_panel(&self, frame: &mut FrameBuffer, lines: &[String], area: Rect) {
        if area.height < 2 {
            return;
        }
        let body = Style::new(PANEL_FG, PANEL_BG);
        frame.fill_rect(area, body);
        frame.fill_rect(Rect::new(area.x, area.y, area.width, 1), body.bg(TOOLBAR_BG));

        let name = self.current_name().unwrap_or_default();
        let title = format!(" {name}  ({} lines)", lines.len());
        frame.paint_clipped(area.x, area.y, &title, body.bg(TOOLBAR_BG).with(Attr::BOLD), area.right());

        let cursor = self.editor.cursor();
        let target = cursor.line().unwrap_or(lines.len());
        let rows = (area.height - 1) as usize;
        let top = target.saturating_sub(rows.saturating_sub(1));
        let gutter = lines.len().max(1).to_string().len();

        // The extra row past the last line is where appended text lands.
        let marked = lines.iter().map(String::as_str).chain(std::iter::once("+"));
        for (i, text) in marked.enumerate().skip(top).take(rows) {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + 1 + (i - top) as u16;
            let style = if i == target { body.bg(CURSOR_LINE_BG) } else { body };
            frame.fill_rect(Rect::new(area.x, y, area.width, 1), style);
            let number = if i < lines.len() {
                format!(" {:>gutter$} ", i + 1)
            } else {
                format!(" {:>gutter$} ", "")
            };
            let used = frame.paint_clipped(area.x, y, &number, style.fg(DIM), area.right());
            frame.paint_clipped(area.x + used, y, text, style, area.right());
        }
    }

    // ── Dialogs ─────────────────────────────────────────────────────

    fn paint_dialog(&mut self, frame: &mut FrameBuffer) {
        let Some(dialog) = &self.dialog else {
            return;
        };
        #[allow(clippy::cast_possible_truncation)]
        let shortcut_rows = Shortcut::ALL.len() as u16;
        let (title, height) = match dialog {
            Dialog::NewFile(_) => ("New note", 5),
            Dialog::ConfirmDelete(_) => ("Delete note", 5),
            Dialog::Settings(_) => ("Settings", 7),
            Dialog::Shortcuts(_) => ("Keyboard shortcuts", shortcut_rows + 4),
        };
        let area = frame.area().centered(60, height);
        if area.is_empty() {
            return;
        }
        let body = Style::new(TEXT, TOOLBAR_BG);
        frame.fill_rect(area, body);
        frame.fill_rect(Rect::new(area.x, area.y, area.width, 1), body.bg(BUTTON_BG));
        frame.paint_clipped(area.x + 1, area.y, title, body.bg(BUTTON_BG).with(Attr::BOLD), area.right());

        let (x, right) = (area.x + 2, area.right().saturating_sub(2));
        let hint_y = area.bottom() - 1;
        let hint_style = body.fg(DIM);
        let mut caret = None;

        match dialog {
            Dialog::NewFile(input) => {
                let used = frame.paint_clipped(x, area.y + 2, "Name: ", body, right);
                caret = Some(paint_input(frame, input, x + used, area.y + 2, right, body));
                frame.paint_clipped(x, hint_y, "Enter create   Esc cancel", hint_style, right);
            }
            Dialog::ConfirmDelete(name) => {
                let text = format!("Delete {name}? (y/n)");
                frame.paint_clipped(x, area.y + 2, &text, body.fg(level_color(Some(Level::Warning))), right);
            }
            Dialog::Settings(form) => {
                frame.paint_clipped(x, area.y + 2, "Notes directory:", body, right);
                let dir_focused = form.field == SettingsField::Directory;
                let field = if dir_focused { body.bg(SELECTED_BG) } else { body.bg(BUTTON_BG) };
                frame.fill_rect(Rect::new(x, area.y + 3, right - x, 1), field);
                let at = paint_input(frame, &form.directory, x, area.y + 3, right, field);
                if dir_focused {
                    caret = Some(at);
                }

                let check = if form.show_status { "[x]" } else { "[ ]" };
                let flag = if dir_focused { body } else { body.bg(SELECTED_BG) };
                frame.paint_clipped(x, area.y + 4, &format!("{check} Show status line"), flag, right);
                frame.paint_clipped(
                    x,
                    hint_y,
                    "Tab switch  Space toggle  Enter apply  Esc cancel",
                    hint_style,
                    right,
                );
            }
            Dialog::Shortcuts(list) => {
                for (i, action) in Shortcut::ALL.into_iter().enumerate() {
                    #[allow(clippy::cast_possible_truncation)]
                    let y = area.y + 2 + i as u16;
                    let selected = i == list.selected;
                    let style = if selected { body.bg(SELECTED_BG) } else { body };
                    frame.fill_rect(Rect::new(x, y, right - x, 1), style);
                    let chord = if selected && list.capturing {
                        "press a key..."
                    } else {
                        self.settings.shortcut(action)
                    };
                    let row = format!("{:<26}{chord}", action.description());
                    frame.paint_clipped(x, y, &row, style, right);
                }
                frame.paint_clipped(x, hint_y, "Enter rebind  r reset  Esc close", hint_style, right);
            }
        }
        self.cursor_screen = caret.map(|cx| (cx, caret_row(dialog, area)));
    }
}

/// Row of the text field in a dialog with one.
const fn caret_row(dialog: &Dialog, area: Rect) -> u16 {
    match dialog {
        Dialog::Settings(_) => area.y + 3,
        _ => area.y + 2,
    }
}

/// Paint `input` from `x`, scrolled so the caret stays before `right`.
/// Returns the caret column.
fn paint_input(frame: &mut FrameBuffer, input: &InputBuffer, x: u16, y: u16, right: u16, style: Style) -> u16 {
    let room = right.saturating_sub(x).saturating_sub(1) as usize;
    let before = input.before_caret();
    let visible = tail_to_width(before, room);
    let caret = x + frame.paint_clipped(x, y, visible, style, right);
    frame.paint_clipped(caret, y, &input.text()[before.len()..], style, right);
    caret
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{FileManager, Report, Settings};
    use fc_term::event_loop::App;
    use fc_term::input::{Event, KeyCode, KeyEvent, Modifiers};
    use fc_term::terminal::Size;
    use std::time::Instant;
    use tempfile::TempDir;

    fn console(w: u16, h: u16) -> (TempDir, FakeConsole, FrameBuffer) {
        let tmp = TempDir::new().unwrap();
        let files = FileManager::new(tmp.path()).unwrap();
        let mut c = FakeConsole::new(Settings::in_memory(), files, None, Instant::now());
        c.user = "me".into();
        c.on_resize(Size::new(w, h));
        (tmp, c, FrameBuffer::new(w, h))
    }

    fn screen(frame: &FrameBuffer) -> Vec<String> {
        (0..frame.height()).map(|y| frame.row_text(y)).collect()
    }

    fn key(code: KeyCode, mods: Modifiers) -> Event {
        Event::Key(KeyEvent::new(code, mods))
    }

    #[test]
    fn prompt_shows_placeholder_without_note() {
        let (_tmp, mut c, mut frame) = console(100, 10);
        c.paint(&mut frame);
        let last = frame.row_text(9);
        assert!(last.contains(r"C:\Users\me>create or open a file first"));
        assert_eq!(c.cursor().map(|(x, y, _)| (x, y)), Some((29 + 12, 9)));
    }

    #[test]
    fn typed_text_and_caret() {
        let (_tmp, mut c, mut frame) = console(100, 10);
        c.open_or_create("n");
        for ch in "abc".chars() {
            c.on_event(&key(KeyCode::Char(ch), Modifiers::empty()));
        }
        c.on_event(&key(KeyCode::Left, Modifiers::empty()));
        c.paint(&mut frame);
        assert!(frame.row_text(9).contains(r"C:\Users\me>abc"));
        let prefix_end = 29 + 12;
        assert_eq!(c.cursor().map(|(x, _, _)| x), Some(prefix_end + 2));
    }

    #[test]
    fn banner_sits_above_prompt() {
        let (_tmp, mut c, mut frame) = console(100, 10);
        c.paint(&mut frame);
        let rows = screen(&frame);
        assert!(rows[6].contains("Microsoft Windows"));
    }

    #[test]
    fn status_line_hidden_by_setting() {
        let (_tmp, mut c, mut frame) = console(100, 10);
        c.report(Report::success("saved"));
        c.paint(&mut frame);
        assert!(frame.row_text(8).contains("[SUCCESS] saved"));

        c.settings.set_show_status(false).unwrap();
        c.paint(&mut frame);
        assert!(!screen(&frame).iter().any(|r| r.contains("[SUCCESS] saved")));
    }

    #[test]
    fn toolbar_lists_notes_and_hides_on_narrow_screen() {
        let (_tmp, mut c, mut frame) = console(100, 10);
        c.open_or_create("alpha");
        c.paint(&mut frame);
        assert!(frame.row_text(3).starts_with(" ● alpha.txt"));

        let (_tmp2, mut narrow, mut small) = console(30, 6);
        narrow.paint(&mut small);
        assert!(small.row_text(5).starts_with(r"C:\Users\me>"));
    }

    #[test]
    fn panel_highlights_cursor_line() {
        let (_tmp, mut c, mut frame) = console(100, 12);
        c.open_or_create("n");
        c.on_event(&Event::Paste("one\ntwo\nthree\n".into()));
        c.on_event(&key(KeyCode::Char('r'), Modifiers::CTRL));
        c.on_event(&key(KeyCode::Up, Modifiers::empty()));
        c.paint(&mut frame);

        let rows = screen(&frame);
        let row = rows.iter().position(|r| r.contains(" 3 three")).unwrap();
        #[allow(clippy::cast_possible_truncation)]
        let y = row as u16;
        let x = frame.width() - 2;
        assert_eq!(frame.get(x, y).unwrap().style.bg, CURSOR_LINE_BG);
        assert!(rows.iter().any(|r| r.contains(" n.txt  (3 lines)")));
    }

    #[test]
    fn dialog_takes_the_cursor() {
        let (_tmp, mut c, mut frame) = console(100, 12);
        c.on_event(&key(KeyCode::Char('n'), Modifiers::CTRL));
        c.on_event(&key(KeyCode::Char('x'), Modifiers::empty()));
        c.paint(&mut frame);
        let (x, y, _) = c.cursor().unwrap();
        assert!(frame.row_text(y).contains("Name: x"));
        assert_eq!(frame.get(x - 1, y).unwrap().ch, 'x');
    }

    #[test]
    fn long_input_keeps_caret_visible() {
        let mut frame = FrameBuffer::new(10, 1);
        let mut input = InputBuffer::new();
        input.set("0123456789abcdef");
        let caret = paint_input(&mut frame, &input, 0, 0, 10, Style::PLAIN);
        assert_eq!(caret, 9);
        assert_eq!(frame.row_text(0).trim_end(), "789abcdef");
    }
}
