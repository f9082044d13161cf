//! Ordered history of past lines with a movable recall cursor.
//!
//! The entry at the back is the "working entry": the edit loop appends the
//! in-progress line before recall starts, mutates it while navigating, and
//! commits or drops it when the line is accepted or cancelled.

use crate::core::text::width::char_width;

const DEFAULT_MAX_SIZE: usize = 100;

#[derive(Debug)]
pub struct History {
    entries: Vec<String>,
    max_size: usize,
    current: usize,
    /// Index committed by the last accepted recall; lets the next session
    /// resume just past that entry on the first down-arrow.
    previous_index: Option<usize>,
    recall_most_recent: bool,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_size: DEFAULT_MAX_SIZE,
            current: 0,
            previous_index: None,
            recall_most_recent: false,
        }
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        if self.entries.len() > max_size {
            let drop = self.entries.len() - max_size;
            self.entries.drain(..drop);
            self.previous_index = self
                .previous_index
                .and_then(|idx| idx.checked_sub(drop));
            self.current = self.current.saturating_sub(drop);
        }
    }

    /// Append a line. A consecutive duplicate of the last entry is dropped;
    /// the oldest entry is evicted once `max_size` is reached.
    pub fn add(&mut self, line: &str) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.last().is_some_and(|last| last == line) {
            return;
        }
        if self.entries.len() >= self.max_size {
            self.entries.remove(0);
            self.previous_index = self.previous_index.and_then(|idx| idx.checked_sub(1));
        }
        self.entries.push(line.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.entries.len()
    }

    pub fn current_pos(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &str {
        &self.entries[self.current]
    }

    pub fn line(&self, index: usize) -> &str {
        &self.entries[index]
    }

    /// Replace the working entry.
    pub fn update_last(&mut self, line: &str) {
        if let Some(last) = self.entries.last_mut() {
            *last = line.to_string();
        }
    }

    /// Drop the working entry (accepted or cancelled line).
    pub fn drop_last(&mut self) {
        self.entries.pop();
        if self.current >= self.entries.len() {
            self.current = self.entries.len().saturating_sub(1);
        }
    }

    /// Move the cursor one entry toward older (`up`) or newer input.
    /// Returns false when no movement was possible. The first move toward
    /// newer input after a committed recall jumps just past the committed
    /// entry instead.
    pub fn move_cursor(&mut self, up: bool) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let previous = self.previous_index.take();
        if !up {
            if let Some(prev) = previous {
                let target = prev + 1;
                if target + 1 < self.entries.len() {
                    self.current = target;
                    self.recall_most_recent = true;
                    return true;
                }
            }
        }
        if up {
            if self.current == 0 {
                return false;
            }
            self.current -= 1;
        } else {
            if self.current + 1 >= self.entries.len() {
                return false;
            }
            self.current += 1;
        }
        self.recall_most_recent = true;
        true
    }

    /// Jump to the first or last entry.
    pub fn jump(&mut self, begin: bool) {
        if self.entries.is_empty() {
            return;
        }
        self.previous_index = None;
        self.current = if begin { 0 } else { self.entries.len() - 1 };
        self.recall_most_recent = true;
    }

    /// Reset the cursor to the given index, or to the working entry.
    pub fn reset_pos(&mut self, pos: Option<usize>) {
        match pos {
            Some(idx) if idx < self.entries.len() => self.current = idx,
            _ => self.current = self.entries.len().saturating_sub(1),
        }
    }

    /// Remember the index the user accepted so the next session can resume
    /// after it; meaningful only when the accepted line was a recall.
    pub fn commit_index(&mut self) {
        self.previous_index = self.recall_most_recent.then_some(self.current);
        self.recall_most_recent = false;
    }

    pub fn set_recall_most_recent(&mut self) {
        self.recall_most_recent = true;
    }

    pub fn reset_recall_most_recent(&mut self) {
        self.recall_most_recent = false;
    }

    /// Scan from the cursor, wrapping around, for an entry whose leading
    /// `prefix_cols` display columns equal those of `text` and that differs
    /// from `text`. Moves the cursor and returns true on a hit. `reverse`
    /// scans toward older entries.
    pub fn common_prefix_search(&mut self, text: &str, prefix_cols: usize, reverse: bool) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let len = self.entries.len();
        let step = if reverse { len - 1 } else { 1 };
        let mut idx = (self.current + step) % len;
        while idx != self.current {
            let entry = &self.entries[idx];
            if entry != text && column_prefix_eq(entry, text, prefix_cols) {
                self.current = idx;
                self.recall_most_recent = true;
                return true;
            }
            idx = (idx + step) % len;
        }
        false
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the first `cols` display columns of both strings coincide.
fn column_prefix_eq(a: &str, b: &str, cols: usize) -> bool {
    let mut acc = 0;
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    while acc < cols {
        match (a_chars.next(), b_chars.next()) {
            (Some(x), Some(y)) => {
                if x != y {
                    return false;
                }
                acc += char_width(x);
            }
            (None, None) => return true,
            _ => return false,
        }
    }
    true
}
