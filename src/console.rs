// SPDX-License-Identifier: MIT
//
// The console: application state and key dispatch.
//
// `FakeConsole` implements the event loop's `App` trait. It owns the
// editing session, the file manager and the settings, and turns key
// presses into calls on them. Every outcome becomes a `Report` on the
// status line. Painting lives in `paint.rs`.
//
// Key routing, first match wins:
//
//   open dialog → rebindable shortcuts → fixed keys (help, dialogs, Tab,
//   Ctrl+K) → focused pane (file browser or prompt)

mod paint;

use std::time::Instant;

use fc_core::autosave::AutoSave;
use fc_core::{
    Document, Error, FileManager, Level, LineChange, LineEditor, Report, Settings, Shortcut,
    UndoOutcome,
};
use fc_term::ansi::CursorShape;
use fc_term::chord::Chord;
use fc_term::event_loop::{Action, App, WindowOp};
use fc_term::frame::FrameBuffer;
use fc_term::input::{Event, KeyCode, KeyEvent, Modifiers};
use fc_term::terminal::{FALLBACK_SIZE, Size};
use tracing::{debug, error, info, warn};

use crate::dialogs::{self, Dialog, Outcome};
use crate::feed::DownloadFeed;
use crate::scrollback::Scrollback;

/// Title of the window being imitated.
pub const WINDOW_TITLE: &str = r"C:\Windows\System32\cmd.exe";

const BANNER: &[&str] = &[
    "Microsoft Windows [Version 10.0.19045.4170]",
    "(c) Microsoft Corporation. All rights reserved.",
    "",
];

/// Which pane receives keys that are not shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Browser,
}

pub struct FakeConsole {
    settings: Settings,
    files: FileManager,
    editor: LineEditor,
    chords: Vec<(Shortcut, Option<Chord>)>,

    scrollback: Scrollback,
    status: Option<Report>,
    status_line: String,

    focus: Focus,
    toolbar_visible: bool,
    browser: Vec<String>,
    selected: usize,
    /// Lines of the open note while the content panel is shown.
    panel: Option<Vec<String>>,
    dialog: Option<Dialog>,

    autosave: AutoSave,
    feed: Option<DownloadFeed>,
    window_ops: Vec<WindowOp>,

    size: Size,
    user: String,
    cursor_screen: Option<(u16, u16)>,
}

impl FakeConsole {
    pub fn new(
        settings: Settings,
        files: FileManager,
        feed: Option<DownloadFeed>,
        now: Instant,
    ) -> Self {
        let mut console = Self {
            chords: Vec::new(),
            settings,
            files,
            editor: LineEditor::new(),
            scrollback: Scrollback::new(),
            status: None,
            status_line: String::new(),
            focus: Focus::Prompt,
            toolbar_visible: true,
            browser: Vec::new(),
            selected: 0,
            panel: None,
            dialog: None,
            autosave: AutoSave::new(now),
            feed,
            window_ops: Vec::new(),
            size: FALLBACK_SIZE,
            user: user_name(),
            cursor_screen: None,
        };
        for line in BANNER {
            console.scrollback.push(line);
        }
        console.rebuild_chords();
        console.refresh_browser();
        console
    }

    // ── Geometry ────────────────────────────────────────────────────

    /// Current terminal size as stored in the geometry setting.
    pub fn geometry(&self) -> String {
        format!("{}x{}", self.size.cols, self.size.rows)
    }

    /// Remember the terminal size for the next start.
    pub fn store_geometry(&mut self) {
        let geometry = self.geometry();
        if let Err(e) = self.settings.set_geometry(&geometry) {
            warn!(error = %e, "could not store window geometry");
        }
    }

    /// Stop the download feed thread.
    pub fn shutdown(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
        }
    }

    // ── Opening notes ───────────────────────────────────────────────

    /// Open `name` from the notes directory, creating it first if missing.
    pub fn open_or_create(&mut self, name: &str) {
        match self.files.create_file(name) {
            Ok(created) => {
                info!(name = %created, "note created from command line");
                self.refresh_browser();
            }
            Err(Error::FileExists(_)) => {}
            Err(e) => {
                self.report_error(&e);
                return;
            }
        }
        self.open_note(name);
    }

    /// File name of the open note.
    fn current_name(&self) -> Option<String> {
        self.editor.document().map(Document::name)
    }

    fn open_note(&mut self, name: &str) {
        match self.files.open_file(name) {
            Ok(doc) => {
                let name = doc.name();
                self.editor.open(doc);
                self.focus = Focus::Prompt;
                self.select_in_browser(&name);
                self.refresh_panel();
                self.report(Report::success(format!("opened {name}")));
            }
            Err(e) => self.report_error(&e),
        }
    }

    // ── Reports ─────────────────────────────────────────────────────

    /// Show `report` on the status line and log it.
    pub fn report(&mut self, report: Report) {
        match report.level {
            Level::Error => error!(text = %report.text, "reported"),
            Level::Warning => warn!(text = %report.text, "reported"),
            Level::Info | Level::Success => info!(text = %report.text, "reported"),
        }
        self.status_line = report.status_line();
        self.status = Some(report);
    }

    fn report_error(&mut self, e: &Error) {
        self.report(Report::from(e));
    }

    fn report_change(&mut self, change: LineChange) {
        let text = match change {
            LineChange::Appended(i) => format!("line {} added", i + 1),
            LineChange::Replaced(i) => format!("line {} updated", i + 1),
            LineChange::Deleted(i) => format!("line {} deleted", i + 1),
            LineChange::Unchanged => return,
        };
        self.report(Report::success(text));
        self.refresh_panel();
    }

    fn show_help(&mut self) {
        let mut lines = vec!["[INFO] Keyboard shortcuts:".to_owned()];
        for action in Shortcut::ALL {
            lines.push(format!(
                "    {:<14} : {}",
                self.settings.shortcut(action),
                action.description()
            ));
        }
        for (keys, what) in [
            ("Ctrl+H / F1", "show this help"),
            ("F2", "settings"),
            ("F3", "edit shortcuts"),
            ("Ctrl+N", "new note"),
            ("Tab", "switch between file list and prompt"),
            ("Up / Down", "select previous / next line"),
            ("Enter", "save the line and move on"),
            ("Ctrl+K", "delete the selected line"),
        ] {
            lines.push(format!("    {keys:<14} : {what}"));
        }
        for line in lines {
            self.scrollback.push(&line);
        }
    }

    // ── Derived state ───────────────────────────────────────────────

    fn rebuild_chords(&mut self) {
        let mut chords = Vec::with_capacity(Shortcut::ALL.len());
        for action in Shortcut::ALL {
            let text = self.settings.shortcut(action);
            let chord = match text.parse::<Chord>() {
                Ok(chord) => Some(chord),
                Err(e) => {
                    warn!(action = action.name(), chord = text, error = %e, "unusable shortcut");
                    None
                }
            };
            chords.push((action, chord));
        }
        self.chords = chords;
    }

    fn refresh_browser(&mut self) {
        match self.files.list_files() {
            Ok(names) => {
                self.browser = names;
                self.selected = self.selected.min(self.browser.len().saturating_sub(1));
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn select_in_browser(&mut self, name: &str) {
        if let Some(i) = self.browser.iter().position(|n| n == name) {
            self.selected = i;
        }
    }

    /// Reload the content panel from disk, if it is open.
    fn refresh_panel(&mut self) {
        if self.panel.is_none() {
            return;
        }
        match self.editor.document().map(Document::read_lines) {
            None => self.panel = None,
            Some(Ok(lines)) => self.panel = Some(lines),
            Some(Err(e)) if e.is_not_found() => self.panel = Some(Vec::new()),
            Some(Err(e)) => self.report_error(&e),
        }
    }

    // ── Key dispatch ────────────────────────────────────────────────

    fn on_key(&mut self, key: &KeyEvent) -> Action {
        if let Some(dialog) = &mut self.dialog {
            let outcome = dialog.handle_key(key);
            if outcome.closes() {
                self.dialog = None;
            }
            self.apply(outcome);
            return Action::Continue;
        }

        let action = self
            .chords
            .iter()
            .find(|(_, chord)| chord.is_some_and(|c| c.matches(key)))
            .map(|&(action, _)| action);
        if let Some(action) = action {
            return self.run_shortcut(action);
        }

        if self.fixed_key(key) {
            return Action::Continue;
        }
        match self.focus {
            Focus::Browser => self.browser_key(key),
            Focus::Prompt => self.prompt_key(key),
        }
        Action::Continue
    }

    fn run_shortcut(&mut self, action: Shortcut) -> Action {
        debug!(action = action.name(), "shortcut");
        match action {
            Shortcut::Close => return Action::Quit,
            Shortcut::Minimize => self.window_ops.push(WindowOp::Iconify),
            Shortcut::ToggleToolbar => {
                self.toolbar_visible = !self.toolbar_visible;
                if !self.toolbar_visible {
                    self.focus = Focus::Prompt;
                }
            }
            Shortcut::Save => self.save(),
            Shortcut::ShowContent => self.toggle_panel(),
            Shortcut::Undo => self.undo(),
            Shortcut::CloseEditor => {
                if self.panel.is_some() {
                    self.panel = None;
                } else {
                    self.focus = Focus::Prompt;
                }
            }
        }
        Action::Continue
    }

    /// Keys that do the same thing regardless of focus.
    fn fixed_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.is_ctrl();
        match key.code {
            KeyCode::F(1) => self.show_help(),
            KeyCode::Char('h') if ctrl => self.show_help(),
            KeyCode::F(2) => {
                let dir = self.files.dir().display().to_string();
                self.dialog = Some(Dialog::settings(&dir, self.settings.show_status()));
            }
            KeyCode::F(3) => self.dialog = Some(Dialog::shortcuts()),
            KeyCode::Char('n') if ctrl => self.dialog = Some(Dialog::new_file()),
            KeyCode::Char('k') if ctrl => self.delete_line(),
            KeyCode::Tab if key.modifiers.is_empty() || key.modifiers == Modifiers::SHIFT => {
                self.focus = match self.focus {
                    Focus::Prompt if self.toolbar_visible => Focus::Browser,
                    _ => Focus::Prompt,
                };
            }
            _ => return false,
        }
        true
    }

    fn browser_key(&mut self, key: &KeyEvent) {
        if !key.modifiers.is_empty() {
            return;
        }
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(self.browser.len().saturating_sub(1));
            }
            KeyCode::Enter => {
                if let Some(name) = self.browser.get(self.selected).cloned() {
                    self.open_note(&name);
                }
            }
            KeyCode::Char('n') => self.dialog = Some(Dialog::new_file()),
            KeyCode::Char('d') => {
                if let Some(name) = self.browser.get(self.selected).cloned() {
                    self.dialog = Some(Dialog::ConfirmDelete(name));
                }
            }
            KeyCode::Char('r') => self.refresh_browser(),
            KeyCode::Escape => self.focus = Focus::Prompt,
            _ => {}
        }
    }

    fn prompt_key(&mut self, key: &KeyEvent) {
        let result = match key.code {
            KeyCode::Enter if key.modifiers.is_empty() => self.editor.process_enter(),
            KeyCode::Up if key.modifiers.is_empty() => self.editor.navigate_up(),
            KeyCode::Down if key.modifiers.is_empty() => self.editor.navigate_down(),
            _ => {
                if self.editor.document().is_some() {
                    dialogs::edit_line(self.editor.input_mut(), key);
                }
                return;
            }
        };
        match result {
            Ok(change) => {
                self.report_change(change);
                // Moving the cursor changes the panel highlight even when
                // nothing was written.
                self.refresh_panel();
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn on_paste(&mut self, text: &str) {
        if let Some(dialog) = &mut self.dialog {
            dialog.handle_paste(text);
            return;
        }
        if self.focus != Focus::Prompt {
            return;
        }
        if self.editor.document().is_none() {
            self.report_error(&Error::NoCurrentFile);
            return;
        }

        let text = text.replace("\r\n", "\n");
        if !text.contains('\n') {
            self.editor.input_mut().insert_str(&text);
            return;
        }
        let mut lines: Vec<&str> = text.split('\n').collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        match self.editor.append_lines(&lines) {
            Ok(n) => {
                self.report(Report::success(format!("{n} lines pasted")));
                self.refresh_panel();
            }
            Err(e) => self.report_error(&e),
        }
    }

    // ── Operations ──────────────────────────────────────────────────

    fn save(&mut self) {
        match self.editor.save() {
            Ok(LineChange::Unchanged) => self.report(Report::info("nothing to save")),
            Ok(change) => self.report_change(change),
            Err(e) => self.report_error(&e),
        }
    }

    fn undo(&mut self) {
        match self.editor.undo() {
            Ok(UndoOutcome::Restored { remaining }) => {
                self.report(Report::success(format!(
                    "undone ({remaining} steps left)"
                )));
                self.refresh_panel();
            }
            Ok(UndoOutcome::NothingToUndo) => self.report(Report::warning("nothing to undo")),
            Err(e) => self.report_error(&e),
        }
    }

    fn delete_line(&mut self) {
        match self.editor.delete_current_line() {
            Ok(i) => {
                self.report(Report::success(format!("line {} deleted", i + 1)));
                self.refresh_panel();
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn toggle_panel(&mut self) {
        if self.panel.is_some() {
            self.panel = None;
        } else if self.editor.document().is_none() {
            self.report_error(&Error::NoCurrentFile);
        } else {
            self.panel = Some(Vec::new());
            self.refresh_panel();
        }
    }

    /// Auto-save on the timer. Returns `true` if anything was reported.
    fn auto_save(&mut self, now: Instant) -> bool {
        if !self.autosave.poll(now) || self.editor.document().is_none() {
            return false;
        }
        match self.editor.save() {
            Ok(LineChange::Unchanged) => false,
            Ok(change) => {
                debug!(?change, "auto-saved");
                self.report(Report::success("auto-saved"));
                self.refresh_panel();
                true
            }
            Err(e) => {
                self.report_error(&e);
                true
            }
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pending | Outcome::Cancel => {}
            Outcome::CreateFile(name) => match self.files.create_file(&name) {
                Ok(name) => {
                    self.refresh_browser();
                    self.open_note(&name);
                    self.report(Report::success(format!("created {name}")));
                }
                Err(e) => self.report_error(&e),
            },
            Outcome::DeleteFile(name) => match self.files.delete_file(&name) {
                Ok(path) => {
                    if self.editor.document().map(Document::path) == Some(path.as_path()) {
                        self.editor.close();
                        self.panel = None;
                    }
                    self.refresh_browser();
                    self.report(Report::success(format!("deleted {name}")));
                }
                Err(e) => self.report_error(&e),
            },
            Outcome::ApplySettings {
                directory,
                show_status,
            } => self.apply_settings(&directory, show_status),
            Outcome::Rebind(action, chord) => {
                match self.settings.set_shortcut(action, chord.to_string()) {
                    Ok(()) => self.report(Report::success(format!("{action} bound to {chord}"))),
                    Err(e) => self.report_error(&e),
                }
                self.rebuild_chords();
            }
            Outcome::ResetShortcuts => {
                match self.settings.reset_shortcuts() {
                    Ok(()) => self.report(Report::success("shortcuts reset to defaults")),
                    Err(e) => self.report_error(&e),
                }
                self.rebuild_chords();
            }
        }
    }

    fn apply_settings(&mut self, directory: &str, show_status: bool) {
        if let Err(e) = self.settings.set_show_status(show_status) {
            self.report_error(&e);
            return;
        }
        if self.files.dir() == std::path::Path::new(directory) {
            self.report(Report::success("settings saved"));
            return;
        }
        let result = self
            .files
            .update_directory(directory)
            .and_then(|()| self.settings.set_novel_directory(self.files.dir()));
        match result {
            Ok(()) => {
                self.selected = 0;
                self.refresh_browser();
                self.report(Report::success(format!("notes directory is now {directory}")));
            }
            Err(e) => self.report_error(&e),
        }
    }
}

// ─── App implementation ──────────────────────────────────────────────────────

impl App for FakeConsole {
    fn on_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) if key.is_press() => self.on_key(key),
            Event::Key(_) => Action::Continue,
            Event::Paste(text) => {
                self.on_paste(text);
                Action::Continue
            }
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.size = size;
    }

    fn on_tick(&mut self, now: Instant) -> bool {
        let mut dirty = self.auto_save(now);
        if let Some(feed) = &self.feed {
            let lines = feed.drain();
            dirty |= !lines.is_empty();
            for line in lines {
                self.scrollback.push(&line);
            }
        }
        dirty
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.paint_frame(frame);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        self.cursor_screen
            .map(|(x, y)| (x, y, CursorShape::BlinkUnderline))
    }

    fn take_window_ops(&mut self) -> Vec<WindowOp> {
        std::mem::take(&mut self.window_ops)
    }
}

/// The user name shown in the prompt.
fn user_name() -> String {
    ["USERNAME", "USER"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "User".to_owned())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fc_term::input::KeyEventKind;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, Modifiers::empty()))
    }

    fn ch(c: char) -> Event {
        press(KeyCode::Char(c))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), Modifiers::CTRL))
    }

    fn enter() -> Event {
        press(KeyCode::Enter)
    }

    fn esc() -> Event {
        press(KeyCode::Escape)
    }

    fn type_str(c: &mut FakeConsole, s: &str) {
        for ch in s.chars() {
            c.on_event(&Event::Key(KeyEvent::new(KeyCode::Char(ch), Modifiers::empty())));
        }
    }

    fn feed(c: &mut FakeConsole, events: &[Event]) {
        for event in events {
            c.on_event(event);
        }
    }

    fn console() -> (TempDir, FakeConsole) {
        let tmp = TempDir::new().unwrap();
        let files = FileManager::new(tmp.path()).unwrap();
        let c = FakeConsole::new(Settings::in_memory(), files, None, Instant::now());
        (tmp, c)
    }

    /// A console with `name` created and opened.
    fn console_with_note(name: &str) -> (TempDir, FakeConsole) {
        let (tmp, mut c) = console();
        feed(&mut c, &[ctrl('n')]);
        type_str(&mut c, name);
        feed(&mut c, &[enter()]);
        (tmp, c)
    }

    fn note_text(tmp: &TempDir, name: &str) -> String {
        fs::read_to_string(tmp.path().join(name)).unwrap()
    }

    fn status_level(c: &FakeConsole) -> Option<Level> {
        c.status.as_ref().map(|r| r.level)
    }

    // ── Notes ─────────────────────────────────────────────────────────

    #[test]
    fn new_note_dialog_creates_and_opens() {
        let (tmp, c) = console_with_note("chapter1");
        assert!(c.dialog.is_none());
        assert!(tmp.path().join("chapter1.txt").exists());
        assert_eq!(c.current_name().as_deref(), Some("chapter1.txt"));
        assert_eq!(c.browser, ["chapter1.txt"]);
        assert!(c.editor.cursor().is_append());
    }

    #[test]
    fn duplicate_note_is_a_warning() {
        let (_tmp, mut c) = console_with_note("a");
        feed(&mut c, &[ctrl('n')]);
        type_str(&mut c, "a");
        feed(&mut c, &[enter()]);
        assert_eq!(status_level(&c), Some(Level::Warning));
    }

    #[test]
    fn typing_without_note_is_refused() {
        let (_tmp, mut c) = console();
        type_str(&mut c, "lost");
        assert!(c.editor.input().is_empty());
        feed(&mut c, &[enter()]);
        assert_eq!(status_level(&c), Some(Level::Warning));
    }

    #[test]
    fn open_or_create_from_command_line() {
        let (tmp, mut c) = console();
        c.open_or_create("draft");
        assert!(tmp.path().join("draft.txt").exists());
        assert_eq!(c.current_name().as_deref(), Some("draft.txt"));

        fs::write(tmp.path().join("draft.txt"), "kept\n").unwrap();
        c.open_or_create("draft.txt");
        assert_eq!(note_text(&tmp, "draft.txt"), "kept\n");
    }

    // ── Editing ───────────────────────────────────────────────────────

    #[test]
    fn enter_appends_lines() {
        let (tmp, mut c) = console_with_note("n");
        type_str(&mut c, "hello");
        feed(&mut c, &[enter()]);
        type_str(&mut c, "world");
        feed(&mut c, &[enter()]);
        assert_eq!(note_text(&tmp, "n.txt"), "hello\nworld\n");
        assert_eq!(status_level(&c), Some(Level::Success));
    }

    #[test]
    fn up_edits_previous_line() {
        let (tmp, mut c) = console_with_note("n");
        type_str(&mut c, "a");
        feed(&mut c, &[enter()]);
        type_str(&mut c, "b");
        feed(&mut c, &[enter(), press(KeyCode::Up)]);
        assert_eq!(c.editor.input().text(), "b");

        feed(&mut c, &[ch('!'), enter()]);
        assert_eq!(note_text(&tmp, "n.txt"), "a\nb!\n");
        assert!(c.editor.cursor().is_append());
    }

    #[test]
    fn ctrl_k_deletes_and_undo_restores() {
        let (tmp, mut c) = console_with_note("n");
        for line in ["a", "b", "c"] {
            type_str(&mut c, line);
            feed(&mut c, &[enter()]);
        }
        feed(&mut c, &[press(KeyCode::Up), press(KeyCode::Up), ctrl('k')]);
        assert_eq!(note_text(&tmp, "n.txt"), "a\nc\n");

        feed(&mut c, &[ctrl('z')]);
        assert_eq!(note_text(&tmp, "n.txt"), "a\nb\nc\n");
    }

    #[test]
    fn ctrl_k_in_append_mode_warns() {
        let (_tmp, mut c) = console_with_note("n");
        feed(&mut c, &[ctrl('k')]);
        assert_eq!(status_level(&c), Some(Level::Warning));
    }

    #[test]
    fn undo_on_fresh_note_warns() {
        let (tmp, mut c) = console_with_note("n");
        feed(&mut c, &[ctrl('z')]);
        assert_eq!(status_level(&c), Some(Level::Warning));
        assert_eq!(note_text(&tmp, "n.txt"), "");
    }

    #[test]
    fn ctrl_s_saves_typed_text() {
        let (tmp, mut c) = console_with_note("n");
        type_str(&mut c, "draft");
        feed(&mut c, &[ctrl('s')]);
        assert_eq!(note_text(&tmp, "n.txt"), "draft\n");
        assert!(c.editor.input().is_empty());

        feed(&mut c, &[ctrl('s')]);
        assert_eq!(status_level(&c), Some(Level::Info));
        assert_eq!(note_text(&tmp, "n.txt"), "draft\n");
    }

    #[test]
    fn multi_line_paste_appends_in_one_step() {
        let (tmp, mut c) = console_with_note("n");
        c.on_event(&Event::Paste("one\r\ntwo\n\nfour\n".into()));
        assert_eq!(note_text(&tmp, "n.txt"), "one\ntwo\n\nfour\n");

        feed(&mut c, &[ctrl('z')]);
        assert_eq!(note_text(&tmp, "n.txt"), "");
    }

    #[test]
    fn single_line_paste_goes_to_prompt() {
        let (_tmp, mut c) = console_with_note("n");
        c.on_event(&Event::Paste("snippet".into()));
        assert_eq!(c.editor.input().text(), "snippet");
    }

    #[test]
    fn key_release_is_ignored() {
        let (_tmp, mut c) = console_with_note("n");
        let mut key = KeyEvent::new(KeyCode::Char('x'), Modifiers::empty());
        key.kind = KeyEventKind::Release;
        c.on_event(&Event::Key(key));
        assert!(c.editor.input().is_empty());
    }

    // ── Auto-save ─────────────────────────────────────────────────────

    #[test]
    fn auto_save_waits_for_interval() {
        let tmp = TempDir::new().unwrap();
        let files = FileManager::new(tmp.path()).unwrap();
        let t0 = Instant::now();
        let mut c = FakeConsole::new(Settings::in_memory(), files, None, t0);
        c.open_or_create("n");
        type_str(&mut c, "typed");

        assert!(!c.on_tick(t0 + Duration::from_secs(30)));
        assert_eq!(note_text(&tmp, "n.txt"), "");

        assert!(c.on_tick(t0 + Duration::from_secs(61)));
        assert_eq!(note_text(&tmp, "n.txt"), "typed\n");

        // Nothing new typed: the next interval writes nothing.
        assert!(!c.on_tick(t0 + Duration::from_secs(122)));
        assert_eq!(note_text(&tmp, "n.txt"), "typed\n");
    }

    // ── Shortcuts ─────────────────────────────────────────────────────

    #[test]
    fn close_shortcut_quits() {
        let (_tmp, mut c) = console();
        assert_eq!(c.on_event(&ctrl('q')), Action::Quit);
        assert_eq!(c.on_event(&ch('q')), Action::Continue);
    }

    #[test]
    fn minimize_requests_iconify() {
        let (_tmp, mut c) = console();
        feed(&mut c, &[ctrl('m')]);
        assert_eq!(c.take_window_ops(), vec![WindowOp::Iconify]);
        assert!(c.take_window_ops().is_empty());
    }

    #[test]
    fn content_panel_toggles_and_escape_closes() {
        let (_tmp, mut c) = console();
        feed(&mut c, &[ctrl('r')]);
        assert!(!c.panel.is_some());
        assert_eq!(status_level(&c), Some(Level::Warning));

        c.open_or_create("n");
        feed(&mut c, &[ctrl('r')]);
        assert!(c.panel.is_some());
        feed(&mut c, &[esc()]);
        assert!(!c.panel.is_some());
    }

    #[test]
    fn panel_follows_edits() {
        let (_tmp, mut c) = console_with_note("n");
        feed(&mut c, &[ctrl('r')]);
        type_str(&mut c, "fresh");
        feed(&mut c, &[enter()]);
        assert_eq!(c.panel.as_deref(), Some(&["fresh".to_owned()][..]));
    }

    #[test]
    fn rebinding_a_shortcut_takes_effect() {
        let (_tmp, mut c) = console();
        // F3, move to "minimize", Enter to capture, then press Ctrl+J.
        feed(&mut c, &[press(KeyCode::F(3)), press(KeyCode::Down), enter(), ctrl('j')]);
        assert_eq!(c.settings.shortcut(Shortcut::Minimize), "Ctrl+J");
        feed(&mut c, &[esc()]);
        assert!(c.dialog.is_none());

        feed(&mut c, &[ctrl('m')]);
        assert!(c.take_window_ops().is_empty());
        feed(&mut c, &[ctrl('j')]);
        assert_eq!(c.take_window_ops(), vec![WindowOp::Iconify]);
    }

    #[test]
    fn reset_restores_default_shortcuts() {
        let (_tmp, mut c) = console();
        feed(&mut c, &[press(KeyCode::F(3)), enter(), ctrl('j'), ch('r'), esc()]);
        assert_eq!(c.settings.shortcut(Shortcut::Close), "Ctrl+Q");
        assert_eq!(c.on_event(&ctrl('q')), Action::Quit);
    }

    #[test]
    fn toolbar_toggle_moves_focus_back() {
        let (_tmp, mut c) = console();
        feed(&mut c, &[press(KeyCode::Tab)]);
        assert_eq!(c.focus, Focus::Browser);
        feed(&mut c, &[ctrl('b')]);
        assert_eq!(c.focus, Focus::Prompt);
        feed(&mut c, &[press(KeyCode::Tab)]);
        assert_eq!(c.focus, Focus::Prompt);
    }

    // ── File browser ──────────────────────────────────────────────────

    #[test]
    fn browser_opens_selected_note() {
        let (tmp, mut c) = console();
        fs::write(tmp.path().join("a.txt"), "").unwrap();
        fs::write(tmp.path().join("b.txt"), "x\n").unwrap();
        feed(&mut c, &[press(KeyCode::Tab), ch('r'), press(KeyCode::Down), enter()]);
        assert_eq!(c.current_name().as_deref(), Some("b.txt"));
        assert_eq!(c.focus, Focus::Prompt);
    }

    #[test]
    fn deleting_open_note_closes_session() {
        let (tmp, mut c) = console_with_note("gone");
        feed(&mut c, &[press(KeyCode::Tab), ch('d')]);
        assert!(matches!(c.dialog, Some(Dialog::ConfirmDelete(_))));
        feed(&mut c, &[ch('y')]);

        assert!(!tmp.path().join("gone.txt").exists());
        assert!(c.editor.document().is_none());
        assert!(c.browser.is_empty());
    }

    #[test]
    fn deleting_another_note_keeps_session() {
        let (tmp, mut c) = console_with_note("open");
        fs::write(tmp.path().join("other.txt"), "").unwrap();
        feed(&mut c, &[press(KeyCode::Tab), ch('r'), press(KeyCode::Down), ch('d'), ch('y')]);

        assert!(!tmp.path().join("other.txt").exists());
        assert_eq!(c.current_name().as_deref(), Some("open.txt"));
        assert_eq!(c.browser, ["open.txt"]);
    }

    #[test]
    fn declining_delete_keeps_note() {
        let (tmp, mut c) = console_with_note("kept");
        feed(&mut c, &[press(KeyCode::Tab), ch('d'), ch('n')]);
        assert!(tmp.path().join("kept.txt").exists());
        assert!(c.dialog.is_none());
    }

    // ── Settings dialog ───────────────────────────────────────────────

    #[test]
    fn settings_dialog_moves_directory() {
        let (tmp, mut c) = console();
        let other = tmp.path().join("elsewhere");
        feed(&mut c, &[press(KeyCode::F(2)), ctrl('u')]);
        type_str(&mut c, &other.display().to_string());
        feed(&mut c, &[press(KeyCode::Tab), ch(' '), enter()]);

        assert!(other.is_dir());
        assert_eq!(c.files.dir(), other.as_path());
        assert_eq!(c.settings.novel_directory(), other);
        assert!(!c.settings.show_status());
    }

    // ── Help and geometry ─────────────────────────────────────────────

    #[test]
    fn help_lists_current_chords() {
        let (_tmp, mut c) = console();
        let before = c.scrollback.len();
        feed(&mut c, &[press(KeyCode::F(1))]);
        assert!(c.scrollback.len() > before);
        let text: Vec<_> = c.scrollback.tail(usize::MAX).map(|l| l.text.clone()).collect();
        assert!(text.iter().any(|l| l.contains("Ctrl+Q")));
    }

    #[test]
    fn geometry_tracks_resize() {
        let (_tmp, mut c) = console();
        c.on_resize(Size::new(120, 40));
        assert_eq!(c.geometry(), "120x40");
    }
}
