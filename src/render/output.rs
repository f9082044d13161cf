//! Typed terminal commands and a single output gate.
//!
//! Invariant: every write the refresh engine performs flows through
//! `OutputGate::flush(..)`, which coalesces one refresh into one terminal
//! write.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermCmd {
    /// UTF-8 text, possibly containing escape sequences.
    Text(String),
    /// Code points, possibly containing escape-sequence code points.
    Chars(Vec<char>),
    /// Move the cursor up `n` rows (ANSI `CUU`). `n == 0` is a no-op.
    MoveUp(usize),
    /// Move the cursor to an absolute 1-based column (ANSI `CHA`).
    /// `n == 0` is a no-op.
    ColumnAbs(usize),
    /// Clear from the cursor to the end of the screen (ANSI `ED 0`).
    ClearToEnd,
    Newline,
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TermCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TermCmd) {
        self.cmds.push(cmd);
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.cmds.push(TermCmd::Text(text.into()));
    }

    pub fn chars(&mut self, chars: &[char]) {
        self.cmds.push(TermCmd::Chars(chars.to_vec()));
    }

    /// Flush buffered commands as a single terminal write.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let mut out = String::new();
        for cmd in self.cmds.drain(..) {
            match cmd {
                TermCmd::Text(text) => out.push_str(&text),
                TermCmd::Chars(chars) => out.extend(chars),
                TermCmd::MoveUp(n) => {
                    if n > 0 {
                        out.push_str(&format!("\x1b[{n}A"));
                    }
                }
                TermCmd::ColumnAbs(n) => {
                    if n > 0 {
                        out.push_str(&format!("\x1b[{n}G"));
                    }
                }
                TermCmd::ClearToEnd => out.push_str("\x1b[J"),
                TermCmd::Newline => out.push('\n'),
            }
        }
        term.write_text(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputGate, TermCmd};
    use crate::core::terminal::{ClearRegion, Terminal};

    #[derive(Default)]
    struct RecordingTerminal {
        output: String,
        write_calls: usize,
    }

    impl Terminal for RecordingTerminal {
        fn enable_raw_mode(&mut self) -> std::io::Result<()> {
            Ok(())
        }
        fn disable_raw_mode(&mut self) -> std::io::Result<()> {
            Ok(())
        }
        fn read_key(&mut self) -> std::io::Result<i32> {
            Ok(0)
        }
        fn write_text(&mut self, text: &str) {
            self.write_calls += 1;
            self.output.push_str(text);
        }
        fn columns(&self) -> usize {
            80
        }
        fn rows(&self) -> usize {
            24
        }
        fn clear(&mut self, _region: ClearRegion) {}
        fn beep(&mut self) {}
        fn is_tty(&self) -> bool {
            true
        }
    }

    #[test]
    fn flush_coalesces_into_one_write() {
        let mut gate = OutputGate::new();
        gate.push(TermCmd::MoveUp(2));
        gate.push(TermCmd::ColumnAbs(4));
        gate.push(TermCmd::ClearToEnd);
        gate.text("hi");
        gate.chars(&['!', '\n']);

        let mut term = RecordingTerminal::default();
        gate.flush(&mut term);

        assert_eq!(term.output, "\x1b[2A\x1b[4G\x1b[Jhi!\n");
        assert_eq!(term.write_calls, 1);
    }

    #[test]
    fn zero_motion_is_elided() {
        let mut gate = OutputGate::new();
        gate.push(TermCmd::MoveUp(0));
        gate.push(TermCmd::ColumnAbs(0));
        gate.text("x");

        let mut term = RecordingTerminal::default();
        gate.flush(&mut term);
        assert_eq!(term.output, "x");
    }

    #[test]
    fn empty_flush_writes_nothing() {
        let mut gate = OutputGate::new();
        let mut term = RecordingTerminal::default();
        gate.flush(&mut term);
        assert_eq!(term.write_calls, 0);
    }
}
