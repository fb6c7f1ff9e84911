//! Status reports: leveled messages for the status line and console.
//!
//! Every user-visible outcome of an operation becomes a [`Report`]. The shell
//! prints it as `[HH:MM:SS] [LEVEL] text` and colors it by level. The same
//! `[LEVEL]` tags mark lines in the fake download feed, so [`Level::detect`]
//! works on any console line.

use std::fmt;

use chrono::{DateTime, Local};

use crate::error::Error;

/// Severity of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// Every level, in the order they are probed by [`detect`](Self::detect).
    pub const ALL: [Self; 4] = [Self::Error, Self::Warning, Self::Success, Self::Info];

    /// The bracketed tag, e.g. `[ERROR]`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Success => "[SUCCESS]",
            Self::Warning => "[WARNING]",
            Self::Error => "[ERROR]",
        }
    }

    /// Level of the first tag found in `line`, if any.
    #[must_use]
    pub fn detect(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| line.contains(level.tag()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub level: Level,
    pub text: String,
}

impl Report {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Level::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Level::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Level::Warning, text)
    }

    /// `[LEVEL] text`.
    #[must_use]
    pub fn tagged(&self) -> String {
        format!("{} {}", self.level.tag(), self.text)
    }

    /// `[HH:MM:SS] [LEVEL] text` for the given local time.
    #[must_use]
    pub fn status_line_at(&self, now: DateTime<Local>) -> String {
        format!("[{}] {}", now.format("%H:%M:%S"), self.tagged())
    }

    /// `[HH:MM:SS] [LEVEL] text` stamped with the current time.
    #[must_use]
    pub fn status_line(&self) -> String {
        self.status_line_at(Local::now())
    }
}

impl From<&Error> for Report {
    /// Errors are reported at `Error` level, except refusals that only need
    /// the user to do something first.
    fn from(err: &Error) -> Self {
        let level = match err {
            Error::NoCurrentFile | Error::NoLineSelected | Error::FileExists(_) => Level::Warning,
            _ => Level::Error,
        };
        Self::new(level, err.to_string())
    }
}

impl From<Error> for Report {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.tag(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tags() {
        assert_eq!(Level::Info.tag(), "[INFO]");
        assert_eq!(Level::Success.tag(), "[SUCCESS]");
        assert_eq!(Level::Warning.tag(), "[WARNING]");
        assert_eq!(Level::Error.tag(), "[ERROR]");
    }

    #[test]
    fn detect_from_feed_lines() {
        assert_eq!(Level::detect("[ERROR] Failed to fetch"), Some(Level::Error));
        assert_eq!(Level::detect("pkg [SUCCESS] installed"), Some(Level::Success));
        assert_eq!(Level::detect("Downloading numpy..."), None);
    }

    #[test]
    fn status_line_has_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 5, 7).unwrap();
        let r = Report::success("Saved");
        assert_eq!(r.status_line_at(at), "[09:05:07] [SUCCESS] Saved");
    }

    #[test]
    fn refusals_are_warnings() {
        assert_eq!(Report::from(Error::NoLineSelected).level, Level::Warning);
        let io = Error::io(std::path::Path::new("x"))(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        ));
        assert_eq!(Report::from(&io).level, Level::Error);
    }

    #[test]
    fn display_is_tagged() {
        assert_eq!(Report::warning("Nothing to undo").to_string(), "[WARNING] Nothing to undo");
    }
}
