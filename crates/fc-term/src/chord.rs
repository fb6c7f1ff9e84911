// SPDX-License-Identifier: MIT
//
// Key chords: the text form of a keyboard shortcut.
//
// Chords are written `Mod+Mod+Key` with modifiers in the fixed order
// Ctrl, Alt, Shift, Super, e.g. `Ctrl+S`, `Ctrl+Shift+X`, `Esc`, `F2`.
// Parsing is case-insensitive and accepts a few aliases (`Control`,
// `Escape`, `Return`). Letters are stored lowercase with Shift carried as
// a modifier, so a chord captured from a key event formats back to the
// same text that parses into it.

use std::fmt;
use std::str::FromStr;

use crate::input::{KeyCode, KeyEvent, Modifiers};

/// Modifiers that take part in matching. Lock keys and the like are ignored.
const CHORD_MODIFIERS: Modifiers = Modifiers::CTRL
    .union(Modifiers::ALT)
    .union(Modifiers::SHIFT)
    .union(Modifiers::SUPER);

/// A key plus modifiers, comparable against key events.
///
/// ```
/// use fc_term::chord::Chord;
/// use fc_term::input::{KeyCode, KeyEvent, Modifiers};
///
/// let save: Chord = "Ctrl+S".parse().unwrap();
/// assert!(save.matches(&KeyEvent::new(KeyCode::Char('s'), Modifiers::CTRL)));
/// assert_eq!(save.to_string(), "Ctrl+S");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    code: KeyCode,
    modifiers: Modifiers,
}

/// Why a chord string did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordError {
    Empty,
    UnknownModifier(String),
    UnknownKey(String),
}

impl fmt::Display for ChordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty key chord"),
            Self::UnknownModifier(m) => write!(f, "unknown modifier `{m}`"),
            Self::UnknownKey(k) => write!(f, "unknown key `{k}`"),
        }
    }
}

impl std::error::Error for ChordError {}

impl Chord {
    #[must_use]
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        let (code, modifiers) = normalize(code, modifiers);
        Self { code, modifiers }
    }

    /// The chord a key event would trigger. `None` for releases and for
    /// keys that cannot be bound, such as a bare character without Ctrl,
    /// Alt or Super (that would be typing, not a shortcut).
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if !key.is_press() {
            return None;
        }
        let chord = Self::new(key.code, key.modifiers);
        let bindable = match chord.code {
            KeyCode::Char(_) => chord
                .modifiers
                .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER),
            _ => true,
        };
        bindable.then_some(chord)
    }

    #[must_use]
    pub const fn code(&self) -> KeyCode {
        self.code
    }

    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Does `key` trigger this chord? Releases never do.
    #[must_use]
    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.is_press() && Self::new(key.code, key.modifiers) == *self
    }
}

/// Lowercase letters with Shift carried explicitly; Shift+Tab is its own key
/// in legacy mode, so it keeps both.
fn normalize(code: KeyCode, modifiers: Modifiers) -> (KeyCode, Modifiers) {
    let mut modifiers = modifiers & CHORD_MODIFIERS;
    let code = match code {
        KeyCode::Char(ch) if ch.is_uppercase() => {
            modifiers |= Modifiers::SHIFT;
            KeyCode::Char(ch.to_lowercase().next().unwrap_or(ch))
        }
        other => other,
    };
    (code, modifiers)
}

impl FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChordError::Empty);
        }
        // "Ctrl++" binds the plus key.
        let (mods_part, key_part) = match s.strip_suffix("++") {
            Some(head) => (head, "+"),
            None => s.rsplit_once('+').unwrap_or(("", s)),
        };

        let mut modifiers = Modifiers::empty();
        for name in mods_part.split('+').filter(|m| !m.is_empty()) {
            modifiers |= match name.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "meta" | "option" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "super" | "cmd" | "win" => Modifiers::SUPER,
                _ => return Err(ChordError::UnknownModifier(name.to_owned())),
            };
        }

        let code = parse_key(key_part.trim())
            .ok_or_else(|| ChordError::UnknownKey(key_part.to_owned()))?;
        Ok(Self::new(code, modifiers))
    }
}

fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    // Letters in chord text are case-insensitive; Shift must be spelled out.
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(ch.to_lowercase().next().unwrap_or(ch)));
    }
    let lower = name.to_ascii_lowercase();
    Some(match lower.as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        _ => {
            let n: u8 = lower.strip_prefix('f')?.parse().ok()?;
            if !(1..=35).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    })
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl+"),
            (Modifiers::ALT, "Alt+"),
            (Modifiers::SHIFT, "Shift+"),
            (Modifiers::SUPER, "Super+"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(name)?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(ch) => write!(f, "{}", ch.to_uppercase()),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Escape => f.write_str("Esc"),
            KeyCode::Delete => f.write_str("Delete"),
            KeyCode::Insert => f.write_str("Insert"),
            KeyCode::Up => f.write_str("Up"),
            KeyCode::Down => f.write_str("Down"),
            KeyCode::Left => f.write_str("Left"),
            KeyCode::Right => f.write_str("Right"),
            KeyCode::Home => f.write_str("Home"),
            KeyCode::End => f.write_str("End"),
            KeyCode::PageUp => f.write_str("PageUp"),
            KeyCode::PageDown => f.write_str("PageDown"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chord(s: &str) -> Chord {
        s.parse().unwrap()
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    // ── Parsing ───────────────────────────────────────────────────────

    #[test]
    fn parses_default_table() {
        assert_eq!(chord("Ctrl+Q"), Chord::new(KeyCode::Char('q'), Modifiers::CTRL));
        assert_eq!(chord("Ctrl+M"), Chord::new(KeyCode::Char('m'), Modifiers::CTRL));
        assert_eq!(chord("Esc"), Chord::new(KeyCode::Escape, Modifiers::empty()));
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(chord("ctrl+s"), chord("Ctrl+S"));
        assert_eq!(chord("CONTROL+s"), chord("Ctrl+S"));
        assert_eq!(chord("escape"), chord("Esc"));
    }

    #[test]
    fn parses_function_keys_and_combos() {
        assert_eq!(chord("F2"), Chord::new(KeyCode::F(2), Modifiers::empty()));
        assert_eq!(
            chord("Ctrl+Shift+X"),
            Chord::new(KeyCode::Char('x'), Modifiers::CTRL | Modifiers::SHIFT)
        );
        assert_eq!(chord("Ctrl++"), Chord::new(KeyCode::Char('+'), Modifiers::CTRL));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<Chord>(), Err(ChordError::Empty));
        assert_eq!(
            "Hyper+S".parse::<Chord>(),
            Err(ChordError::UnknownModifier("Hyper".into()))
        );
        assert_eq!(
            "Ctrl+Nope".parse::<Chord>(),
            Err(ChordError::UnknownKey("Nope".into()))
        );
        assert!("F99".parse::<Chord>().is_err());
    }

    // ── Formatting ────────────────────────────────────────────────────

    #[test]
    fn display_uses_canonical_order() {
        assert_eq!(chord("shift+ctrl+x").to_string(), "Ctrl+Shift+X");
        assert_eq!(chord("esc").to_string(), "Esc");
        assert_eq!(chord("alt+space").to_string(), "Alt+Space");
    }

    #[test]
    fn display_round_trips_for_defaults() {
        for text in ["Ctrl+Q", "Ctrl+M", "Ctrl+B", "Ctrl+S", "Ctrl+R", "Ctrl+Z", "Esc"] {
            assert_eq!(chord(text).to_string(), text);
        }
    }

    // ── Matching ──────────────────────────────────────────────────────

    #[test]
    fn matches_ctrl_letter() {
        let save = chord("Ctrl+S");
        assert!(save.matches(&key_mod(KeyCode::Char('s'), Modifiers::CTRL)));
        assert!(!save.matches(&key_mod(KeyCode::Char('s'), Modifiers::empty())));
        assert!(!save.matches(&key_mod(KeyCode::Char('s'), Modifiers::CTRL | Modifiers::ALT)));
    }

    #[test]
    fn uppercase_key_counts_as_shift() {
        let c = chord("Ctrl+Shift+X");
        assert!(c.matches(&key_mod(KeyCode::Char('X'), Modifiers::CTRL)));
        assert!(c.matches(&key_mod(KeyCode::Char('x'), Modifiers::CTRL | Modifiers::SHIFT)));
    }

    #[test]
    fn release_never_matches() {
        let mut key = key_mod(KeyCode::Escape, Modifiers::empty());
        key.kind = crate::input::KeyEventKind::Release;
        assert!(!chord("Esc").matches(&key));
    }

    // ── Capture ───────────────────────────────────────────────────────

    #[test]
    fn from_key_captures_modified_keys() {
        let captured = Chord::from_key(&key_mod(KeyCode::Char('k'), Modifiers::CTRL)).unwrap();
        assert_eq!(captured.to_string(), "Ctrl+K");
        assert_eq!(
            Chord::from_key(&key_mod(KeyCode::F(5), Modifiers::empty()))
                .unwrap()
                .to_string(),
            "F5"
        );
    }

    #[test]
    fn from_key_refuses_plain_typing() {
        assert!(Chord::from_key(&key_mod(KeyCode::Char('a'), Modifiers::empty())).is_none());
        assert!(Chord::from_key(&key_mod(KeyCode::Char('A'), Modifiers::SHIFT)).is_none());
    }
}
