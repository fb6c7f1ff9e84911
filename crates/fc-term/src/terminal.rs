// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal control: raw mode, alternate screen, window operations and
// cleanup on drop.
//
// `unsafe` is limited to the POSIX calls (tcgetattr, tcsetattr, ioctl,
// isatty, write) that have no safe std equivalent.
//
// The panic hook writes a prebuilt restore sequence straight to fd 1,
// skipping the stdout lock in case the panic happened mid-flush, then
// restores termios and hands over to the previous hook.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

/// Size used when the terminal cannot be queried.
pub const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

/// Kitty keyboard flags requested on enter. Flag 1 (disambiguate) makes
/// Esc, Ctrl+M and Ctrl+H distinct from Alt prefixes, Enter and Backspace.
const KITTY_FLAGS: u8 = 1;

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// Query the window size with `TIOCGWINSZ`. `None` when stdout is not a
/// terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Is stdin a terminal?
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic restore ───────────────────────────────────────────────────────────

/// The panic hook cannot reach the `Terminal`, so the original termios is
/// also kept here.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Everything `leave` undoes, in one write. Leaving the alternate screen
/// comes last so the shell's screen returns clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[<u\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            #[cfg(unix)]
            restore_termios_from_backup();
            previous(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(EMERGENCY_RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Raw-mode terminal session, restored on drop.
///
/// ```no_run
/// use fc_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// term.set_title("notes")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle sized from the current window. Does not touch the terminal
    /// until [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(FALLBACK_SIZE),
            active: false,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, Kitty keyboard flags and
    /// bracketed paste. No-op when already active.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.enable_raw_mode()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::enable_kitty_keyboard(&mut out, KITTY_FLAGS)?;
        ansi::enable_bracketed_paste(&mut out)?;
        out.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo [`enter`](Self::enter). No-op when inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let mut out = io::stdout().lock();
        ansi::end_sync(&mut out)?;
        ansi::disable_bracketed_paste(&mut out)?;
        ansi::disable_kitty_keyboard(&mut out)?;
        ansi::reset(&mut out)?;
        ansi::set_cursor_shape(&mut out, ansi::CursorShape::Default)?;
        ansi::cursor_show(&mut out)?;
        ansi::exit_alt_screen(&mut out)?;
        out.flush()?;
        drop(out);

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    // ── Window operations ───────────────────────────────────────────

    /// Set the window title.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn set_title(&self, title: &str) -> io::Result<()> {
        write_now(|out| ansi::set_title(out, title))
    }

    /// Ask the terminal emulator to minimize its window. Emulators that
    /// ignore the request leave the window as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn iconify(&self) -> io::Result<()> {
        write_now(ansi::iconify_window)
    }

    /// Ask the terminal emulator to restore a minimized window.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn deiconify(&self) -> io::Result<()> {
        write_now(ansi::deiconify_window)
    }

    /// Ask the terminal emulator to resize its text area. The new size
    /// arrives later through SIGWINCH, if at all.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn request_resize(&self, size: Size) -> io::Result<()> {
        write_now(|out| ansi::resize_window(out, size.cols, size.rows))
    }

    // ── Raw mode ────────────────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }
        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            libc::cfmakeraw(&raw mut termios);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if let Some(original) = self.original_termios.take() {
            let fd = io::stdin().as_raw_fd();
            if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original) } != 0 {
                return Err(io::Error::last_os_error());
            }
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

fn write_now(f: impl FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    f(&mut out)?;
    out.flush()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
