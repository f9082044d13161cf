//! Scripted in-memory terminal for end-to-end keystroke tests.

use std::collections::VecDeque;

use tideline::{ClearRegion, Terminal};

/// Plays back a queue of key events and records everything written. The key
/// queue holds the same integer encoding the real decoder produces; an empty
/// queue reads as end of stream.
pub struct ScriptedTerminal {
    pub keys: VecDeque<i32>,
    pub written: String,
    pub beeps: usize,
    pub clears: usize,
    pub raw_enables: usize,
    pub raw_disables: usize,
    pub cols: usize,
    pub rows: usize,
    pub resizes: VecDeque<usize>,
}

impl ScriptedTerminal {
    pub fn new(keys: impl IntoIterator<Item = i32>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            written: String::new(),
            beeps: 0,
            clears: 0,
            raw_enables: 0,
            raw_disables: 0,
            cols: 80,
            rows: 24,
            resizes: VecDeque::new(),
        }
    }
}

impl Terminal for ScriptedTerminal {
    fn enable_raw_mode(&mut self) -> std::io::Result<()> {
        self.raw_enables += 1;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> std::io::Result<()> {
        self.raw_disables += 1;
        Ok(())
    }

    fn read_key(&mut self) -> std::io::Result<i32> {
        Ok(self.keys.pop_front().unwrap_or(0))
    }

    fn write_text(&mut self, text: &str) {
        self.written.push_str(text);
    }

    fn columns(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn clear(&mut self, _region: ClearRegion) {
        self.clears += 1;
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }

    fn is_tty(&self) -> bool {
        true
    }

    fn take_resize(&mut self) -> bool {
        match self.resizes.pop_front() {
            Some(cols) => {
                self.cols = cols;
                true
            }
            None => false,
        }
    }
}

/// The key events for a literal piece of typed text.
pub fn typed(text: &str) -> Vec<i32> {
    text.chars().map(|ch| ch as i32).collect()
}
