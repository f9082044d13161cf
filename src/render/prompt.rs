//! Prompt descriptors: the static prompt and the incremental-search overlay.

use crate::core::text::width::char_width;
use crate::render::output::OutputGate;

/// Geometry of a rendered prompt. Control characters other than `'\n'` are
/// stripped; editing happens after the last prompt line, starting at
/// `indentation`.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: Vec<char>,
    pub byte_len: usize,
    /// Total visible display columns.
    pub display_cols: usize,
    /// Index of the first code point of the last prompt line.
    pub last_line_start: usize,
    /// Rows beyond the first that the prompt occupies (wrap or `'\n'`).
    pub extra_lines: usize,
    /// Column where input begins on the last prompt line.
    pub indentation: usize,
    /// Cached terminal width the geometry was computed for.
    pub screen_cols: usize,
    /// Display width of the previously drawn prompt (overlay swaps).
    pub previous_prompt_cols: usize,
    /// Display width of the previously drawn input line.
    pub previous_input_cols: usize,
    /// Rows between the first prompt row and the cursor after the last
    /// refresh.
    pub cursor_row_offset: usize,
}

impl Prompt {
    pub fn new(text: &str, screen_cols: usize) -> Self {
        let chars: Vec<char> = text
            .chars()
            .filter(|&ch| ch == '\n' || !ch.is_control())
            .collect();
        let byte_len = chars.iter().map(|ch| ch.len_utf8()).sum();

        let mut x = 0;
        let mut extra_lines = 0;
        let mut last_line_start = 0;
        let mut display_cols = 0;
        for (i, &ch) in chars.iter().enumerate() {
            if ch == '\n' {
                x = 0;
                extra_lines += 1;
                last_line_start = i + 1;
                continue;
            }
            let width = char_width(ch);
            display_cols += width;
            x += width;
            if screen_cols > 0 && x >= screen_cols {
                x = 0;
                extra_lines += 1;
                last_line_start = i + 1;
            }
        }

        Self {
            text: chars,
            byte_len,
            display_cols,
            last_line_start,
            extra_lines,
            indentation: x,
            screen_cols,
            previous_prompt_cols: 0,
            previous_input_cols: 0,
            cursor_row_offset: extra_lines,
        }
    }

    /// A single-row prompt made of this prompt's last line; used when the
    /// search overlay hands the screen back.
    pub fn last_line(&self) -> Self {
        let text: String = self.text[self.last_line_start..].iter().collect();
        Self::new(&text, self.screen_cols)
    }

    pub fn write(&self, gate: &mut OutputGate) {
        gate.chars(&self.text);
    }
}

/// Direction of an incremental history search: toward older entries or
/// toward newer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Backward,
    Forward,
}

impl SearchDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Backward => Self::Forward,
            Self::Forward => Self::Backward,
        }
    }

    /// The scan step: -1 toward older entries, +1 toward newer.
    pub fn step(self) -> i64 {
        match self {
            Self::Backward => -1,
            Self::Forward => 1,
        }
    }
}

/// The `(reverse-i-search)` overlay: a regenerated prompt plus the search
/// direction and the user-typed search text.
#[derive(Debug)]
pub struct SearchPrompt {
    pub base: Prompt,
    pub direction: SearchDirection,
    pub failed: bool,
    pub search_text: Vec<char>,
}

impl SearchPrompt {
    pub fn new(original: &Prompt, direction: SearchDirection) -> Self {
        let mut overlay = Self {
            base: Prompt::new("", original.screen_cols),
            direction,
            failed: false,
            search_text: Vec::new(),
        };
        overlay.base.previous_prompt_cols = original.previous_prompt_cols;
        overlay.base.previous_input_cols = original.previous_input_cols;
        overlay.update();
        overlay
    }

    /// Regenerate the overlay text after the direction, failure state, or
    /// search text changed. Geometry is rebuilt; draw bookkeeping survives.
    pub fn update(&mut self) {
        let label = match (self.failed, self.direction) {
            (false, SearchDirection::Backward) => "(reverse-i-search)`",
            (false, SearchDirection::Forward) => "(i-search)`",
            (true, SearchDirection::Backward) => "(failed reverse-i-search)`",
            (true, SearchDirection::Forward) => "(failed i-search)`",
        };
        let mut text = String::from(label);
        text.extend(self.search_text.iter());
        text.push_str("': ");

        let previous_prompt_cols = self.base.previous_prompt_cols;
        let previous_input_cols = self.base.previous_input_cols;
        let cursor_row_offset = self.base.cursor_row_offset;
        self.base = Prompt::new(&text, self.base.screen_cols);
        self.base.previous_prompt_cols = previous_prompt_cols;
        self.base.previous_input_cols = previous_input_cols;
        self.base.cursor_row_offset = cursor_row_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::{Prompt, SearchDirection, SearchPrompt};

    #[test]
    fn one_line_prompt_geometry() {
        let prompt = Prompt::new("> ", 80);
        assert_eq!(prompt.indentation, 2);
        assert_eq!(prompt.extra_lines, 0);
        assert_eq!(prompt.last_line_start, 0);
        assert_eq!(prompt.display_cols, 2);
    }

    #[test]
    fn newline_starts_a_fresh_line() {
        let prompt = Prompt::new("state\n>> ", 80);
        assert_eq!(prompt.extra_lines, 1);
        assert_eq!(prompt.indentation, 3);
        assert_eq!(prompt.last_line_start, 6);
    }

    #[test]
    fn wide_prompt_wraps_on_narrow_screens() {
        let prompt = Prompt::new("0123456789abc", 10);
        assert_eq!(prompt.extra_lines, 1);
        assert_eq!(prompt.indentation, 3);
    }

    #[test]
    fn control_characters_are_stripped() {
        let prompt = Prompt::new("a\x07b> ", 80);
        let text: String = prompt.text.iter().collect();
        assert_eq!(text, "ab> ");
    }

    #[test]
    fn last_line_keeps_the_indentation() {
        let prompt = Prompt::new("head\n> ", 80);
        let last = prompt.last_line();
        assert_eq!(last.extra_lines, 0);
        assert_eq!(last.indentation, prompt.indentation);
    }

    #[test]
    fn overlay_text_tracks_direction_and_search_text() {
        let base = Prompt::new("> ", 80);
        let mut overlay = SearchPrompt::new(&base, SearchDirection::Backward);
        overlay.search_text = "gam".chars().collect();
        overlay.update();
        let text: String = overlay.base.text.iter().collect();
        assert_eq!(text, "(reverse-i-search)`gam': ");

        overlay.direction = SearchDirection::Forward;
        overlay.failed = true;
        overlay.update();
        let text: String = overlay.base.text.iter().collect();
        assert_eq!(text, "(failed i-search)`gam': ");
    }
}
