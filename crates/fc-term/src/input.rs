// SPDX-License-Identifier: MIT
//
// Keyboard input parser.
//
// Turns raw stdin bytes into key and paste events. Understands the input
// encodings the terminal layer turns on:
//
// - Legacy CSI sequences (arrows, editing keys, F5-F20)
// - SS3 sequences (F1-F4 and arrows from some terminals)
// - Kitty keyboard protocol `CSI codepoint ; modifiers u`
// - Bracketed paste, delivered as one event
// - ESC-prefixed Alt chords
// - UTF-8 multi-byte characters
//
// Sequences can be split across reads, so unparsed bytes stay buffered
// until the next `advance`. A lone ESC is ambiguous until a short timeout
// passes with no more input; the event loop then calls `flush`.

use bitflags::bitflags;

// ─── Events ──────────────────────────────────────────────────────────────────

/// A parsed input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Text between the bracketed-paste delimiters.
    Paste(String),
}

/// A key with its modifiers and press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with `modifiers`.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    /// Is this a press or auto-repeat (not a release)?
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    /// Ctrl held, Alt not.
    #[must_use]
    pub const fn is_ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL) && !self.modifiers.contains(Modifiers::ALT)
    }

    /// The character this key would type, if it types one.
    ///
    /// Shift is allowed; Ctrl, Alt and Super are not.
    #[must_use]
    pub fn typed_char(&self) -> Option<char> {
        let blocked = Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER;
        match self.code {
            KeyCode::Char(ch) if !self.modifiers.intersects(blocked) && !ch.is_control() => {
                Some(ch)
            }
            _ => None,
        }
    }
}

/// Press, repeat or release. Legacy encodings only report presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Which key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F35.
    F(u8),
}

bitflags! {
    /// Modifier keys, in the Kitty/xterm bit order (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental byte-to-event parser.
///
/// ```
/// use fc_term::input::{Event, KeyCode, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"\x1b[A");
/// assert!(matches!(events[0], Event::Key(k) if k.code == KeyCode::Up));
/// ```
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            in_paste: false,
        }
    }

    /// Feed bytes and return every complete event.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(rest, PASTE_END) else {
                    break;
                };
                events.push(Event::Paste(
                    String::from_utf8_lossy(&rest[..end]).into_owned(),
                ));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            // A prefix of the paste opener: wait rather than misparse it.
            if rest.len() < PASTE_START.len() && rest.len() > 2 && PASTE_START.starts_with(rest) {
                break;
            }

            match parse_one(rest) {
                Parsed::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Parsed::Skip(used) => pos += used,
                Parsed::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Are bytes waiting for the rest of a sequence?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up on waiting and turn pending bytes into plain keys.
    ///
    /// A lone ESC becomes Escape. Inside an unterminated paste, the
    /// collected text is delivered as a paste.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            self.in_paste = false;
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            self.buf.clear();
            return vec![Event::Paste(text)];
        }

        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(press(KeyCode::Escape)),
                0x7F => Some(press(KeyCode::Backspace)),
                0x01..=0x1A => Some(ctrl(KeyCode::Char(char::from(byte + b'a' - 1)))),
                0x20..=0x7E => Some(press(KeyCode::Char(char::from(byte)))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

enum Parsed {
    /// An event and how many bytes it used.
    Event(Event, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized; drop this many bytes.
    Skip(usize),
}

fn parse_one(buf: &[u8]) -> Parsed {
    let Some(&lead) = buf.first() else {
        return Parsed::Incomplete;
    };
    match lead {
        0x1B => parse_escape(buf),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x00 => Parsed::Event(ctrl(KeyCode::Char(' ')), 1),
        b @ 0x01..=0x1A => Parsed::Event(ctrl(KeyCode::Char(char::from(b + b'a' - 1))), 1),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xF7 => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        0x7F => Parsed::Event(key_with(KeyCode::Backspace, Modifiers::ALT), 2),
        0x0D => Parsed::Event(key_with(KeyCode::Enter, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(
                KeyCode::Char(char::from(b + b'a' - 1)),
                Modifiers::ALT | Modifiers::CTRL,
            ),
            2,
        ),
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes are 0x20..=0x3F; the final byte
    // is 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let params = parse_params(&buf[2..end]);
    let used = end + 1;
    let mods = params.get(1).map_or(Modifiers::empty(), |p| decode_modifiers(p.value));

    let code = match buf[end] {
        b'~' => match tilde_key(params.first().map_or(0, |p| p.value)) {
            Some(code) => code,
            None => return Parsed::Skip(used),
        },
        b'u' => return Parsed::Event(kitty_key(&params), used),
        b'Z' => return Parsed::Event(key_with(KeyCode::Tab, Modifiers::SHIFT), used),
        final_byte => match letter_key(final_byte) {
            Some(code) => code,
            None => return Parsed::Skip(used),
        },
    };
    Parsed::Event(key_with(code, mods), used)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    letter_key(b).map_or(Parsed::Skip(3), |code| Parsed::Event(press(code), 3))
}

/// `CSI codepoint[:alternates] ; modifiers[:event] u`
fn kitty_key(params: &[Param]) -> Event {
    let codepoint = params.first().map_or(0, |p| p.value);
    let (mods, event_type) = params
        .get(1)
        .map_or((Modifiers::empty(), 0), |p| (decode_modifiers(p.value), p.sub));

    let kind = match event_type {
        2 => KeyEventKind::Repeat,
        3 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    };
    Event::Key(KeyEvent {
        code: kitty_keycode(codepoint),
        modifiers: mods,
        kind,
    })
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Event(press(KeyCode::Char(ch)), len))
}

// ─── Key tables ──────────────────────────────────────────────────────────────

/// `CSI n ~` editing and function keys.
#[allow(clippy::cast_possible_truncation)]
const fn tilde_key(n: u32) -> Option<KeyCode> {
    Some(match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((n - 10) as u8),
        17..=21 => KeyCode::F((n - 11) as u8),
        23..=26 => KeyCode::F((n - 12) as u8),
        28 | 29 => KeyCode::F((n - 13) as u8),
        31..=34 => KeyCode::F((n - 14) as u8),
        _ => return None,
    })
}

/// Final bytes shared by CSI and SS3.
const fn letter_key(b: u8) -> Option<KeyCode> {
    Some(match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    })
}

/// Kitty reports functional keys in the private use area from 57344.
fn kitty_keycode(cp: u32) -> KeyCode {
    match cp {
        27 | 57344 => KeyCode::Escape,
        13 | 57345 => KeyCode::Enter,
        9 | 57346 => KeyCode::Tab,
        8 | 127 | 57347 => KeyCode::Backspace,
        57348 => KeyCode::Insert,
        57349 => KeyCode::Delete,
        57350 => KeyCode::Left,
        57351 => KeyCode::Right,
        57352 => KeyCode::Up,
        57353 => KeyCode::Down,
        57354 => KeyCode::PageUp,
        57355 => KeyCode::PageDown,
        57356 => KeyCode::Home,
        57357 => KeyCode::End,
        #[allow(clippy::cast_possible_truncation)]
        57364..=57398 => KeyCode::F((cp - 57363) as u8),
        _ => char::from_u32(cp).map_or(KeyCode::Char('\u{fffd}'), KeyCode::Char),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn ctrl(code: KeyCode) -> Event {
    key_with(code, Modifiers::CTRL)
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

/// One `;`-separated CSI parameter with its optional `:` sub-parameter.
struct Param {
    value: u32,
    sub: u32,
}

fn parse_params(raw: &[u8]) -> Vec<Param> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            let mut parts = field.split(|&b| b == b':');
            let value = parts.next().map_or(0, parse_number);
            let sub = parts.next().map_or(0, parse_number);
            Param { value, sub }
        })
        .collect()
}

fn parse_number(digits: &[u8]) -> u32 {
    digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, &b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

/// `1 + bits`; 0 and 1 both mean none. Lock-key bits above SUPER are ignored.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u32) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Vec<Event> {
        Parser::new().advance(bytes)
    }

    fn parse_one_key(bytes: &[u8]) -> KeyEvent {
        let events = parse(bytes);
        assert_eq!(events.len(), 1, "expected one event from {bytes:?}: {events:?}");
        match events[0] {
            Event::Key(k) => k,
            ref other => panic!("expected key, got {other:?}"),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, Modifiers::empty())
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    // ── Plain bytes ───────────────────────────────────────────────────

    #[test]
    fn ascii_letters() {
        assert_eq!(parse_one_key(b"a"), key(KeyCode::Char('a')));
        assert_eq!(parse_one_key(b"Z"), key(KeyCode::Char('Z')));
    }

    #[test]
    fn control_bytes() {
        assert_eq!(parse_one_key(b"\r"), key(KeyCode::Enter));
        assert_eq!(parse_one_key(b"\t"), key(KeyCode::Tab));
        assert_eq!(parse_one_key(b"\x7f"), key(KeyCode::Backspace));
        assert_eq!(
            parse_one_key(b"\x13"),
            key_mod(KeyCode::Char('s'), Modifiers::CTRL)
        );
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(parse_one_key("é".as_bytes()), key(KeyCode::Char('é')));
        assert_eq!(parse_one_key("中".as_bytes()), key(KeyCode::Char('中')));
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "中".as_bytes();
        let mut p = Parser::new();
        assert!(p.advance(&bytes[..1]).is_empty());
        assert!(p.has_pending());
        let events = p.advance(&bytes[1..]);
        assert_eq!(events, vec![Event::Key(key(KeyCode::Char('中')))]);
    }

    // ── Escape sequences ──────────────────────────────────────────────

    #[test]
    fn arrows_csi_and_ss3() {
        assert_eq!(parse_one_key(b"\x1b[A"), key(KeyCode::Up));
        assert_eq!(parse_one_key(b"\x1b[B"), key(KeyCode::Down));
        assert_eq!(parse_one_key(b"\x1bOC"), key(KeyCode::Right));
        assert_eq!(parse_one_key(b"\x1bOP"), key(KeyCode::F(1)));
    }

    #[test]
    fn modified_arrow() {
        assert_eq!(
            parse_one_key(b"\x1b[1;5A"),
            key_mod(KeyCode::Up, Modifiers::CTRL)
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse_one_key(b"\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(parse_one_key(b"\x1b[5~"), key(KeyCode::PageUp));
        assert_eq!(parse_one_key(b"\x1b[15~"), key(KeyCode::F(5)));
        assert_eq!(parse_one_key(b"\x1b[24~"), key(KeyCode::F(12)));
        assert_eq!(
            parse_one_key(b"\x1b[3;2~"),
            key_mod(KeyCode::Delete, Modifiers::SHIFT)
        );
    }

    #[test]
    fn alt_prefix() {
        assert_eq!(
            parse_one_key(b"\x1bx"),
            key_mod(KeyCode::Char('x'), Modifiers::ALT)
        );
    }

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![Event::Key(key(KeyCode::Escape))]);
        assert!(!p.has_pending());
    }

    #[test]
    fn unknown_csi_is_dropped() {
        assert!(parse(b"\x1b[99X").is_empty());
    }

    // ── Kitty protocol ────────────────────────────────────────────────

    #[test]
    fn kitty_disambiguates_ctrl_m_and_ctrl_h() {
        assert_eq!(
            parse_one_key(b"\x1b[109;5u"),
            key_mod(KeyCode::Char('m'), Modifiers::CTRL)
        );
        assert_eq!(
            parse_one_key(b"\x1b[104;5u"),
            key_mod(KeyCode::Char('h'), Modifiers::CTRL)
        );
    }

    #[test]
    fn kitty_escape_and_enter() {
        assert_eq!(parse_one_key(b"\x1b[27u"), key(KeyCode::Escape));
        assert_eq!(parse_one_key(b"\x1b[13u"), key(KeyCode::Enter));
    }

    #[test]
    fn kitty_shift_ctrl() {
        assert_eq!(
            parse_one_key(b"\x1b[120;6u"),
            key_mod(KeyCode::Char('x'), Modifiers::CTRL | Modifiers::SHIFT)
        );
    }

    #[test]
    fn kitty_release() {
        let k = parse_one_key(b"\x1b[97;1:3u");
        assert_eq!(k.kind, KeyEventKind::Release);
        assert!(!k.is_press());
    }

    #[test]
    fn kitty_function_key() {
        assert_eq!(parse_one_key(b"\x1b[57364u"), key(KeyCode::F(1)));
    }

    // ── Paste ─────────────────────────────────────────────────────────

    #[test]
    fn bracketed_paste_is_one_event() {
        let events = parse(b"\x1b[200~line one\nline two\x1b[201~");
        assert_eq!(events, vec![Event::Paste("line one\nline two".into())]);
    }

    #[test]
    fn paste_split_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[20").is_empty());
        assert!(p.advance(b"0~abc").is_empty());
        let events = p.advance(b"def\x1b[201~x");
        assert_eq!(
            events,
            vec![
                Event::Paste("abcdef".into()),
                Event::Key(key(KeyCode::Char('x'))),
            ]
        );
    }

    #[test]
    fn unterminated_paste_flushes_as_paste() {
        let mut p = Parser::new();
        p.advance(b"\x1b[200~partial");
        assert_eq!(p.flush(), vec![Event::Paste("partial".into())]);
    }

    // ── KeyEvent helpers ──────────────────────────────────────────────

    #[test]
    fn typed_char_rejects_ctrl() {
        assert_eq!(key(KeyCode::Char('a')).typed_char(), Some('a'));
        assert_eq!(
            key_mod(KeyCode::Char('A'), Modifiers::SHIFT).typed_char(),
            Some('A')
        );
        assert_eq!(
            key_mod(KeyCode::Char('a'), Modifiers::CTRL).typed_char(),
            None
        );
        assert_eq!(key(KeyCode::Enter).typed_char(), None);
    }
}
