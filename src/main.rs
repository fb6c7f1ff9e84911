// SPDX-License-Identifier: MIT
//
// fake-console: a note-taking app dressed up as a Windows command prompt.
//
// This is the binary that wires the two crates together:
//
//   fc-term → terminal control, rendering, input parsing, event loop
//   fc-core → notes on disk, the line editor, settings
//
// `FakeConsole` implements fc-term's `App` trait. Each keypress flows
// through:
//
//   stdin → parser → on_event → dialog / shortcut / prompt → LineEditor
//   paint → frame buffer → diff renderer → terminal
//
// Logs go to a file under the platform data directory, never to the
// terminal, which the UI owns.

mod console;
mod dialogs;
mod feed;
mod scrollback;

use std::env;
use std::fs::{self, OpenOptions};
use std::process;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fc_core::{FileManager, Report, Settings};
use fc_term::event_loop::{EventLoop, LoopConfig};
use fc_term::terminal::Size;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use console::{FakeConsole, WINDOW_TITLE};
use feed::DownloadFeed;

/// Average gap between fake download lines.
const FEED_PACE: Duration = Duration::from_millis(400);

const USAGE: &str = "usage: fake-console [FILE]

Opens FILE from the notes directory, creating it if missing.
Press Ctrl+H inside the console for the key list.";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("-h" | "--help") => {
            println!("{USAGE}");
            return;
        }
        Some("-V" | "--version") => {
            println!("fake-console {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut startup = Vec::new();
    let settings = load_settings(&mut startup);
    let files = match FileManager::new(settings.novel_directory()) {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "notes directory unusable, falling back to the current directory");
            startup.push(Report::from(&e));
            FileManager::new(".").unwrap_or_else(|e| {
                eprintln!("fake-console: {e}");
                process::exit(1);
            })
        }
    };

    let initial_size = settings.geometry().and_then(parse_geometry);
    let feed = DownloadFeed::spawn(FEED_PACE);
    let mut console = FakeConsole::new(settings, files, feed, Instant::now());
    for report in startup {
        console.report(report);
    }
    if let Some(name) = args.first() {
        console.open_or_create(name);
    }

    let config = LoopConfig::new()
        .title(WINDOW_TITLE)
        .initial_size(initial_size);
    let result = EventLoop::new(config).run(&mut console);

    console.shutdown();
    console.store_geometry();
    match result {
        Ok(()) => info!("exiting"),
        Err(e) => {
            error!(error = %e, "terminal failure");
            eprintln!("fake-console: {e}");
            process::exit(1);
        }
    }
}

/// Send `tracing` output to `<data_local_dir>/fake-console/fake-console.log`.
/// Without a writable log file, logging stays off.
fn init_logging() {
    let Some(dir) = dirs::data_local_dir().map(|d| d.join("fake-console")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("fake-console.log"))
    else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Settings from the default location. An unreadable or corrupt file gives
/// defaults, which overwrite it on the next change.
fn load_settings(startup: &mut Vec<Report>) -> Settings {
    match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "settings unusable, using defaults");
            startup.push(Report::warning(format!("settings reset to defaults: {e}")));
            match Settings::default_path() {
                Ok(path) => Settings::defaults_at(path),
                Err(_) => Settings::in_memory(),
            }
        }
    }
}

/// Parse a stored `COLSxROWS` geometry.
fn parse_geometry(text: &str) -> Option<Size> {
    let (cols, rows) = text.trim().split_once(['x', 'X'])?;
    let cols: u16 = cols.trim().parse().ok()?;
    let rows: u16 = rows.trim().parse().ok()?;
    (cols > 0 && rows > 0).then(|| Size::new(cols, rows))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_parses() {
        assert_eq!(parse_geometry("120x40"), Some(Size::new(120, 40)));
        assert_eq!(parse_geometry(" 80 X 24 "), Some(Size::new(80, 24)));
    }

    #[test]
    fn bad_geometry_is_ignored() {
        assert_eq!(parse_geometry(""), None);
        assert_eq!(parse_geometry("80"), None);
        assert_eq!(parse_geometry("0x24"), None);
        assert_eq!(parse_geometry("800+600"), None);
        assert_eq!(parse_geometry("99999x10"), None);
    }
}
