//! Terminal trait and color escapes.
//!
//! The editor consumes a terminal only through this interface: raw-mode
//! toggles, one decoded key event at a time, byte/code-point writes, screen
//! dimensions, region clears, and a bell.

use std::io;

/// Region argument to [`Terminal::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearRegion {
    Whole,
    ToEnd,
}

/// Colors the display assembly pass can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    Brown,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    Gray,
    BrightRed,
    BrightGreen,
    Yellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    White,
    /// Mismatched-brace indicator: white on a red background.
    Error,
}

/// The VT100 escape for a color.
pub fn ansi_color(color: Color) -> &'static str {
    match color {
        Color::Default => "\x1b[0m",
        Color::Black => "\x1b[0;22;30m",
        Color::Red => "\x1b[0;22;31m",
        Color::Green => "\x1b[0;22;32m",
        Color::Brown => "\x1b[0;22;33m",
        Color::Blue => "\x1b[0;22;34m",
        Color::Magenta => "\x1b[0;22;35m",
        Color::Cyan => "\x1b[0;22;36m",
        Color::LightGray => "\x1b[0;22;37m",
        Color::Gray => "\x1b[0;1;30m",
        Color::BrightRed => "\x1b[0;1;31m",
        Color::BrightGreen => "\x1b[0;1;32m",
        Color::Yellow => "\x1b[0;1;33m",
        Color::BrightBlue => "\x1b[0;1;34m",
        Color::BrightMagenta => "\x1b[0;1;35m",
        Color::BrightCyan => "\x1b[0;1;36m",
        Color::White => "\x1b[0;1;37m",
        Color::Error => "\x1b[0;1;37;41m",
    }
}

/// Terminal primitives the edit loop runs on.
///
/// `read_key` returns the modifier-tagged event encoding from
/// [`crate::core::keys`]; the sentinel `0` means a signal (resize or end of
/// stream) interrupted the read.
pub trait Terminal {
    fn enable_raw_mode(&mut self) -> io::Result<()>;

    /// Restore the saved terminal attributes. Idempotent; called on every
    /// exit path from the edit loop.
    fn disable_raw_mode(&mut self) -> io::Result<()>;

    fn read_key(&mut self) -> io::Result<i32>;

    fn write_text(&mut self, text: &str);

    fn write_chars(&mut self, chars: &[char]) {
        let text: String = chars.iter().collect();
        self.write_text(&text);
    }

    fn columns(&self) -> usize;

    fn rows(&self) -> usize;

    fn clear(&mut self, region: ClearRegion);

    fn beep(&mut self);

    fn is_tty(&self) -> bool;

    /// TERM is on the deny-list of terminals that cannot do cursor motion.
    fn is_unsupported(&self) -> bool {
        false
    }

    /// Job-control stop (`Ctrl-Z`): leave raw mode, stop the process, and
    /// re-enter raw mode once resumed. A no-op off POSIX.
    fn suspend(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Consume a pending resize notification. After `read_key` returns the
    /// signal sentinel, the edit loop uses this to tell a resize apart from
    /// end of stream.
    fn take_resize(&mut self) -> bool {
        false
    }

    /// Line-buffered fallback used for non-TTY input and deny-listed
    /// terminals. `None` signals end of stream.
    fn read_plain_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::BufRead::read_line(&mut io::stdin().lock(), &mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::{ansi_color, Color};

    #[test]
    fn default_resets_attributes() {
        assert_eq!(ansi_color(Color::Default), "\x1b[0m");
    }

    #[test]
    fn bright_colors_carry_the_bold_attribute() {
        assert!(ansi_color(Color::BrightMagenta).contains(";1;"));
        assert!(ansi_color(Color::Red).contains(";22;"));
    }
}
