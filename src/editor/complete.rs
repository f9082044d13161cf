//! Tab completion: common-prefix extension, disambiguation, and paginated
//! candidate listing.

use tracing::debug;

use crate::core::keys::{ctrl_key, normalize_ctrl};
use crate::core::line::NO_HINT;
use crate::core::terminal::{ansi_color, ClearRegion, Color, Terminal};
use crate::editor::{Editor, HintAction, ReadlineError};
use crate::render::prompt::Prompt;

fn longest_common_prefix(candidates: &[Vec<char>]) -> usize {
    let Some(sample) = candidates.first() else {
        return 0;
    };
    let mut prefix = 0;
    loop {
        let Some(&expected) = sample.get(prefix) else {
            return prefix;
        };
        for candidate in &candidates[1..] {
            match candidate.get(prefix) {
                Some(&ch) if ch == expected => {}
                _ => return prefix,
            }
        }
        prefix += 1;
    }
}

impl<T: Terminal> Editor<T> {
    fn read_completion_key(&mut self) -> Result<i32, ReadlineError> {
        loop {
            let key = self.term.read_key()?;
            if key != 0 {
                return Ok(normalize_ctrl(key));
            }
            if !self.term.take_resize() {
                // end of stream; let the outer loop wind down
                return Ok(0);
            }
        }
    }

    /// Run the completion callback against the word at the cursor and either
    /// splice in the unambiguous extension or show the candidate list.
    /// Returns a keystroke for the outer loop to run next, or 0.
    pub(crate) fn complete_line(&mut self, pi: &mut Prompt) -> Result<i32, ReadlineError> {
        let mut context_len = self.context_length();
        let text = self.line.utf8_prefix(self.line.pos);
        let completions: Vec<Vec<char>> = match self.completion.as_mut() {
            Some(hook) => hook(&text, &mut context_len)
                .into_iter()
                .map(|word| word.chars().collect())
                .collect(),
            None => Vec::new(),
        };
        let context_len = context_len.min(self.line.pos);
        if completions.is_empty() {
            self.term.beep();
            return Ok(0);
        }
        debug!(candidates = completions.len(), context_len, "completing");

        let mut effective_count = completions.len();
        let mut selected = 0;
        if self.line.hint_selection != NO_HINT {
            selected = (self.line.hint_selection.max(0) as usize).min(completions.len() - 1);
            effective_count = 1;
        }
        let prefix_len = if effective_count == 1 {
            completions[selected].len()
        } else {
            longest_common_prefix(&completions)
        };
        if self.options.beep_on_ambiguous && effective_count != 1 {
            self.term.beep();
        }

        // an extension beyond the typed context resolves immediately
        if prefix_len > context_len || effective_count == 1 {
            if prefix_len > context_len {
                let extension = completions[selected][context_len..prefix_len].to_vec();
                let at = self.line.pos;
                self.line.insert_slice(at, &extension);
                self.line.pos += extension.len();
            }
            self.line.prefix = self.line.pos;
            self.refresh_line(pi, HintAction::Regenerate);
            return Ok(0);
        }

        let mut key = 0;
        if self.options.double_tab_completion {
            key = self.read_completion_key()?;
            if key != ctrl_key('I') {
                return Ok(key);
            }
        }

        let mut show_completions = true;
        let mut on_new_line = false;
        if completions.len() > self.options.completion_cutoff {
            let saved_pos = self.line.pos;
            self.line.pos = self.line.len();
            self.refresh_line(pi, HintAction::Regenerate);
            self.line.pos = saved_pos;
            self.term.write_text(&format!(
                "\nDisplay all {} possibilities? (y or n)",
                completions.len()
            ));
            on_new_line = true;
            loop {
                key = self.read_completion_key()?;
                if matches!(key, k if k == 'y' as i32
                    || k == 'Y' as i32
                    || k == 'n' as i32
                    || k == 'N' as i32
                    || k == ctrl_key('C')
                    || k == 0)
                {
                    break;
                }
            }
            match key {
                k if k == 'n' as i32 || k == 'N' as i32 || k == 0 => show_completions = false,
                k if k == ctrl_key('C') => {
                    show_completions = false;
                    self.term.write_text("^C");
                    key = 0;
                }
                _ => {}
            }
        }

        let mut stop_list = false;
        if show_completions {
            let longest = completions
                .iter()
                .map(|candidate| candidate.len())
                .max()
                .unwrap_or(0)
                + 2;
            let column_count = (pi.screen_cols / longest).max(1);

            if on_new_line {
                self.term.clear(ClearRegion::ToEnd);
            } else {
                let saved_pos = self.line.pos;
                self.line.pos = self.line.len();
                self.refresh_line(pi, HintAction::Skip);
                self.line.pos = saved_pos;
            }

            let mut pause_row = self.term.rows().saturating_sub(1);
            let row_count = completions.len().div_ceil(column_count);
            for row in 0..row_count {
                if row == pause_row {
                    self.term.write_text("\n--More--");
                    loop {
                        key = self.read_completion_key()?;
                        if matches!(key, k if k == ' ' as i32
                            || k == '\r' as i32
                            || k == '\n' as i32
                            || k == 'y' as i32
                            || k == 'Y' as i32
                            || k == 'n' as i32
                            || k == 'N' as i32
                            || k == 'q' as i32
                            || k == 'Q' as i32
                            || k == ctrl_key('C')
                            || k == 0)
                        {
                            break;
                        }
                        self.term.beep();
                    }
                    match key {
                        k if k == ' ' as i32 || k == 'y' as i32 || k == 'Y' as i32 => {
                            self.term.write_text("\r        \r");
                            pause_row += self.term.rows().saturating_sub(1);
                        }
                        k if k == '\r' as i32 || k == '\n' as i32 => {
                            self.term.write_text("\r        \r");
                            pause_row += 1;
                        }
                        k if k == ctrl_key('C') => {
                            self.term.write_text("^C");
                            stop_list = true;
                        }
                        _ => {
                            self.term.write_text("\r        \r");
                            stop_list = true;
                        }
                    }
                } else {
                    self.term.write_text("\n");
                }
                if stop_list {
                    break;
                }
                for column in 0..column_count {
                    let index = column * row_count + row;
                    let Some(candidate) = completions.get(index) else {
                        continue;
                    };
                    // typed context rendered in color, candidate tail plain
                    let context_start = self.line.pos - context_len;
                    let shared = &self.line.chars()[context_start..context_start + prefix_len];
                    if !self.options.no_color {
                        self.term.write_text(ansi_color(Color::BrightMagenta));
                    }
                    self.term.write_chars(shared);
                    if !self.options.no_color {
                        self.term.write_text(ansi_color(Color::Default));
                    }
                    self.term.write_chars(&candidate[prefix_len..]);
                    if (column + 1) * row_count + row < completions.len() {
                        let padding = " ".repeat(longest.saturating_sub(candidate.len()));
                        self.term.write_text(&padding);
                    }
                }
            }
        }

        // prompt on a fresh line, then the input buffer again
        if !stop_list || key == ctrl_key('C') {
            self.term.write_text("\n");
        }
        self.write_prompt(pi);
        pi.cursor_row_offset = pi.extra_lines;
        self.refresh_line(pi, HintAction::Regenerate);
        Ok(0)
    }
}
