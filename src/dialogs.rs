// SPDX-License-Identifier: MIT
//
// Modal dialogs.
//
// Each dialog is a small state machine fed key events by the console. A
// key either leaves the dialog waiting (`Outcome::Pending`) or produces a
// request the console carries out against the core. Dialogs never touch
// files or settings themselves, which keeps them testable with plain
// key events.

use fc_core::Shortcut;
use fc_core::input::InputBuffer;
use fc_term::chord::Chord;
use fc_term::input::{KeyCode, KeyEvent, Modifiers};

/// What a key press inside a dialog asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Still open, nothing to do.
    Pending,
    Cancel,
    CreateFile(String),
    DeleteFile(String),
    ApplySettings { directory: String, show_status: bool },
    Rebind(Shortcut, Chord),
    ResetShortcuts,
}

impl Outcome {
    /// Does the dialog close after this outcome?
    #[must_use]
    pub const fn closes(&self) -> bool {
        !matches!(self, Self::Pending | Self::Rebind(..) | Self::ResetShortcuts)
    }
}

#[derive(Debug, Clone)]
pub enum Dialog {
    NewFile(InputBuffer),
    ConfirmDelete(String),
    Settings(SettingsForm),
    Shortcuts(ShortcutList),
}

impl Dialog {
    #[must_use]
    pub const fn new_file() -> Self {
        Self::NewFile(InputBuffer::new())
    }

    #[must_use]
    pub fn settings(directory: &str, show_status: bool) -> Self {
        let mut input = InputBuffer::new();
        input.set(directory);
        Self::Settings(SettingsForm {
            directory: input,
            show_status,
            field: SettingsField::Directory,
        })
    }

    #[must_use]
    pub const fn shortcuts() -> Self {
        Self::Shortcuts(ShortcutList {
            selected: 0,
            capturing: false,
        })
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Outcome {
        match self {
            Self::NewFile(input) => match key.code {
                KeyCode::Escape => Outcome::Cancel,
                KeyCode::Enter if input.text().trim().is_empty() => Outcome::Pending,
                KeyCode::Enter => Outcome::CreateFile(input.text().trim().to_owned()),
                _ => {
                    edit_line(input, key);
                    Outcome::Pending
                }
            },
            Self::ConfirmDelete(name) => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => Outcome::DeleteFile(name.clone()),
                KeyCode::Char('n' | 'N') | KeyCode::Escape => Outcome::Cancel,
                _ => Outcome::Pending,
            },
            Self::Settings(form) => form.handle_key(key),
            Self::Shortcuts(list) => list.handle_key(key),
        }
    }

    /// Pasted text goes into whichever text field has focus, first line only.
    pub fn handle_paste(&mut self, text: &str) {
        let first = text.lines().next().unwrap_or_default();
        match self {
            Self::NewFile(input) => input.insert_str(first),
            Self::Settings(form) if form.field == SettingsField::Directory => {
                form.directory.insert_str(first);
            }
            _ => {}
        }
    }
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Directory,
    ShowStatus,
}

#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub directory: InputBuffer,
    pub show_status: bool,
    pub field: SettingsField,
}

impl SettingsForm {
    fn handle_key(&mut self, key: &KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Escape => return Outcome::Cancel,
            KeyCode::Enter => {
                let directory = self.directory.text().trim().to_owned();
                if directory.is_empty() {
                    return Outcome::Pending;
                }
                return Outcome::ApplySettings {
                    directory,
                    show_status: self.show_status,
                };
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.field = match self.field {
                    SettingsField::Directory => SettingsField::ShowStatus,
                    SettingsField::ShowStatus => SettingsField::Directory,
                };
                return Outcome::Pending;
            }
            _ => {}
        }
        match self.field {
            SettingsField::Directory => {
                edit_line(&mut self.directory, key);
            }
            SettingsField::ShowStatus => {
                if key.code == KeyCode::Char(' ') {
                    self.show_status = !self.show_status;
                }
            }
        }
        Outcome::Pending
    }
}

// ─── Shortcuts ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ShortcutList {
    pub selected: usize,
    /// Waiting for the key press that becomes the new chord.
    pub capturing: bool,
}

impl ShortcutList {
    #[must_use]
    pub fn selected_action(&self) -> Shortcut {
        Shortcut::ALL[self.selected.min(Shortcut::ALL.len() - 1)]
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Outcome {
        if self.capturing {
            if key.code == KeyCode::Escape && key.modifiers.is_empty() {
                self.capturing = false;
                return Outcome::Pending;
            }
            return Chord::from_key(key).map_or(Outcome::Pending, |chord| {
                self.capturing = false;
                Outcome::Rebind(self.selected_action(), chord)
            });
        }

        match key.code {
            KeyCode::Escape => Outcome::Cancel,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Outcome::Pending
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(Shortcut::ALL.len() - 1);
                Outcome::Pending
            }
            KeyCode::Enter => {
                self.capturing = true;
                Outcome::Pending
            }
            KeyCode::Char('r') if key.modifiers.is_empty() => Outcome::ResetShortcuts,
            _ => Outcome::Pending,
        }
    }
}

// ─── Line editing ────────────────────────────────────────────────────────────

/// Apply a single-line editing key to `input`. Returns `true` if the key
/// was an editing key.
pub fn edit_line(input: &mut InputBuffer, key: &KeyEvent) -> bool {
    if let Some(ch) = key.typed_char() {
        input.insert_char(ch);
        return true;
    }
    let ctrl = key.modifiers.contains(Modifiers::CTRL);
    match key.code {
        KeyCode::Backspace if ctrl || key.modifiers.contains(Modifiers::ALT) => {
            input.delete_word_back();
        }
        KeyCode::Backspace => {
            input.backspace();
        }
        KeyCode::Char('w') if ctrl => {
            input.delete_word_back();
        }
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Delete => {
            input.delete();
        }
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::Char('a') if ctrl => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char('e') if ctrl => input.move_end(),
        _ => return false,
    }
    true
}

// ─── Tests ───────────────────────────────────────────────────────────────────
