// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop.
//
// Stdin bytes arrive from the reader thread, the parser turns them into
// events, the application handles them and paints a frame, and the diff
// renderer writes out what changed.
//
// The loop blocks on the byte channel with a timeout. Input is handled as
// soon as it arrives; when nothing arrives the timeout doubles as the tick
// that drives time-based state (autosave, the fake download feed) and as
// the ESC timeout that resolves a lone ESC into the Escape key. Frames are
// only painted when something changed.
//
// Resizes come in through SIGWINCH, which sets an atomic flag checked once
// per iteration.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::ansi::{self, CursorShape};
use crate::diff::DiffRenderer;
use crate::frame::FrameBuffer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// What to do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A request to the terminal emulator's window, issued by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowOp {
    Title(String),
    Iconify,
    Resize(Size),
}

/// Something the event loop can drive.
///
/// Per iteration the loop calls [`on_event`](App::on_event) for each
/// input event, [`on_resize`](App::on_resize) after SIGWINCH,
/// [`on_tick`](App::on_tick), then [`paint`](App::paint) and
/// [`cursor`](App::cursor) if anything changed. Window requests collected
/// by [`take_window_ops`](App::take_window_ops) are written after the
/// events are handled.
pub trait App {
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// Also called once before the first frame.
    fn on_resize(&mut self, _size: Size) {}

    /// Return `true` if state changed and the frame needs repainting.
    fn on_tick(&mut self, _now: Instant) -> bool {
        false
    }

    /// Paint into a buffer that has already been cleared.
    fn paint(&mut self, frame: &mut FrameBuffer);

    /// Where to show the hardware cursor, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }

    /// Drain pending window requests.
    fn take_window_ops(&mut self) -> Vec<WindowOp> {
        Vec::new()
    }
}

// ─── LoopConfig ──────────────────────────────────────────────────────────────

/// Event loop settings.
#[derive(Debug, Clone, Default)]
pub struct LoopConfig {
    /// Channel timeout; also the tick period and the ESC timeout.
    pub tick: Duration,
    /// Window title set on start.
    pub title: Option<String>,
    /// Window size requested on start.
    pub initial_size: Option<Size>,
}

impl LoopConfig {
    pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

    #[must_use]
    pub fn new() -> Self {
        Self {
            tick: Self::DEFAULT_TICK,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn initial_size(mut self, size: Option<Size>) -> Self {
        self.initial_size = size;
        self
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer for one application run.
///
/// ```no_run
/// use fc_term::event_loop::{Action, App, EventLoop, LoopConfig};
/// use fc_term::frame::FrameBuffer;
/// use fc_term::input::{Event, KeyCode};
/// use fc_term::style::Style;
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_event(&mut self, event: &Event) -> Action {
///         match event {
///             Event::Key(k) if k.code == KeyCode::Char('q') => Action::Quit,
///             _ => Action::Continue,
///         }
///     }
///
///     fn paint(&mut self, frame: &mut FrameBuffer) {
///         frame.paint_text(0, 0, "press q", Style::PLAIN);
///     }
/// }
///
/// EventLoop::new(LoopConfig::new()).run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            config,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until the application quits or stdin closes,
    /// then restore the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up, rendering fails,
    /// or the reader thread cannot start.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        if let Some(title) = &self.config.title {
            self.terminal.set_title(title)?;
        }
        if let Some(size) = self.config.initial_size {
            self.terminal.request_resize(size)?;
        }

        let result = StdinReader::spawn().and_then(|(mut reader, rx)| {
            let result = self.run_inner(app, &rx);
            reader.stop();
            result
        });

        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        app.on_resize(size);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(self.config.tick) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            for event in &events {
                if app.on_event(event) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !events.is_empty();

            for op in app.take_window_ops() {
                self.apply(&op)?;
            }

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick(Instant::now());

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame);
                self.renderer.flush()?;
                self.place_cursor(app.cursor())?;
                dirty = false;
            }
        }
    }

    fn apply(&self, op: &WindowOp) -> io::Result<()> {
        match op {
            WindowOp::Title(title) => self.terminal.set_title(title),
            WindowOp::Iconify => self.terminal.iconify(),
            WindowOp::Resize(size) => self.terminal.request_resize(*size),
        }
    }

    #[allow(clippy::unused_self)]
    fn place_cursor(&self, cursor: Option<(u16, u16, CursorShape)>) -> io::Result<()> {
        let mut out = io::stdout().lock();
        match cursor {
            Some((x, y, shape)) => {
                ansi::cursor_to(&mut out, x, y)?;
                ansi::set_cursor_shape(&mut out, shape)?;
                ansi::cursor_show(&mut out)?;
            }
            None => ansi::cursor_hide(&mut out)?,
        }
        out.flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
