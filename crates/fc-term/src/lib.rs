// SPDX-License-Identifier: MIT
//
// fc-term: Terminal layer for fake-console.
//
// Raw-mode terminal control, input parsing, a cell frame buffer and a
// differential renderer, wired together by a small event loop. Output is
// plain ANSI/xterm escape sequences written straight to stdout. Input is
// parsed from raw stdin bytes, with the Kitty keyboard protocol requested
// so that Ctrl+M, Ctrl+H and Esc arrive as their own keys.

pub mod ansi;
pub mod chord;
pub mod diff;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod reader;
pub mod style;
pub mod terminal;
