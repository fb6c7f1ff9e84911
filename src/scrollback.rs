// SPDX-License-Identifier: MIT
//
// Console scrollback: the lines shown above the prompt.
//
// Lines come from the fake download feed and from help output. Each line
// remembers the level tag it carries so the painter can color it. A line
// starting with `\r` overwrites the last line instead of adding one, the
// way a progress bar does in a real console.

use std::collections::VecDeque;

use fc_core::Level;

/// Lines kept before the oldest are dropped.
pub const MAX_LINES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    pub level: Option<Level>,
}

impl ConsoleLine {
    fn new(text: &str) -> Self {
        Self {
            level: Level::detect(text),
            text: text.to_owned(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Scrollback {
    lines: VecDeque<ConsoleLine>,
}

impl Scrollback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, or replace the last one if `text` starts with `\r`.
    /// Embedded newlines split into several lines.
    pub fn push(&mut self, text: &str) {
        if let Some(rest) = text.strip_prefix('\r') {
            self.lines.pop_back();
            self.push(rest);
            return;
        }
        for line in text.split('\n') {
            self.lines.push_back(ConsoleLine::new(line.trim_end_matches('\r')));
        }
        while self.lines.len() > MAX_LINES {
            self.lines.pop_front();
        }
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter().skip(self.lines.len().saturating_sub(n))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(s: &Scrollback) -> Vec<&str> {
        s.tail(usize::MAX).map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn push_appends() {
        let mut s = Scrollback::new();
        s.push("one");
        s.push("two");
        assert_eq!(texts(&s), ["one", "two"]);
    }

    #[test]
    fn carriage_return_replaces_last() {
        let mut s = Scrollback::new();
        s.push("Collecting numpy");
        s.push("progress 10%");
        s.push("\rprogress 50%");
        s.push("\rprogress 100%");
        assert_eq!(texts(&s), ["Collecting numpy", "progress 100%"]);
    }

    #[test]
    fn carriage_return_on_empty_just_adds() {
        let mut s = Scrollback::new();
        s.push("\rfirst");
        assert_eq!(texts(&s), ["first"]);
    }

    #[test]
    fn levels_are_detected() {
        let mut s = Scrollback::new();
        s.push("[ERROR] boom");
        s.push("plain");
        assert_eq!(s.tail(2).next().unwrap().level, Some(Level::Error));
        assert_eq!(s.tail(1).next().unwrap().level, None);
    }

    #[test]
    fn multi_line_text_splits() {
        let mut s = Scrollback::new();
        s.push("a\nb");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn oldest_lines_are_dropped() {
        let mut s = Scrollback::new();
        for i in 0..MAX_LINES + 5 {
            s.push(&i.to_string());
        }
        assert_eq!(s.len(), MAX_LINES);
        assert_eq!(s.tail(MAX_LINES).next().unwrap().text, "5");
    }

    #[test]
    fn tail_takes_newest() {
        let mut s = Scrollback::new();
        for t in ["a", "b", "c"] {
            s.push(t);
        }
        let tail: Vec<_> = s.tail(2).map(|l| l.text.as_str()).collect();
        assert_eq!(tail, ["b", "c"]);
    }
}
