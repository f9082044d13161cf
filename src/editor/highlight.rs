//! Display assembly: brace matching, highlight colors, and hints.

use crate::core::line::NO_HINT;
use crate::core::terminal::{ansi_color, Color, Terminal};
use crate::editor::{Editor, HintAction};
use crate::render::prompt::Prompt;

fn push_color(display: &mut Vec<char>, color: Color) {
    display.extend(ansi_color(color).chars());
}

impl<T: Terminal> Editor<T> {
    /// Find the brace matching the one under the cursor. Returns its index
    /// and whether the pairing crossed a mismatched bracket kind.
    pub(crate) fn scan_matching_brace(&self) -> (Option<usize>, bool) {
        if self.line.pos >= self.line.len() {
            return (None, false);
        }
        let under = self.line.char_at(self.line.pos);
        let (direction, same, partner) = match under {
            '}' => (-1i64, '}', '{'),
            ']' => (-1, ']', '['),
            ')' => (-1, ')', '('),
            '{' => (1, '}', '{'),
            '[' => (1, ']', '['),
            '(' => (1, ')', '('),
            _ => return (None, false),
        };

        let mut unmatched = direction;
        let mut unmatched_other = 0i64;
        let mut i = self.line.pos as i64 + direction;
        while i >= 0 && (i as usize) < self.line.len() {
            let ch = self.line.char_at(i as usize);
            if matches!(ch, '}' | ']' | ')') {
                if ch == same {
                    unmatched -= 1;
                } else {
                    unmatched_other -= 1;
                }
            } else if matches!(ch, '{' | '[' | '(') {
                if ch == partner {
                    unmatched += 1;
                } else {
                    unmatched_other += 1;
                }
            }
            if unmatched == 0 {
                return (Some(i as usize), unmatched_other != 0);
            }
            i += direction;
        }
        (None, false)
    }

    /// Rebuild the display buffer: one color slot per code point, the
    /// highlighter's overrides, and the brace-match accent, flattened into
    /// code points with embedded escapes.
    pub(crate) fn assemble_display(&mut self, highlight_idx: Option<usize>, error: bool) {
        let len = self.line.len();
        let mut colors = vec![Color::Default; len];
        if let Some(hook) = self.highlighter.as_mut() {
            let text: String = self.line.chars().iter().collect();
            hook(&text, &mut colors);
            colors.resize(len, Color::Default);
        }
        if let Some(idx) = highlight_idx {
            if idx < len {
                colors[idx] = if error { Color::Error } else { Color::BrightRed };
            }
        }

        let mut display = Vec::with_capacity(len + 16);
        let mut current = Color::Default;
        for i in 0..len {
            if colors[i] != current {
                current = colors[i];
                push_color(&mut display, current);
            }
            display.push(self.line.char_at(i));
        }
        push_color(&mut display, Color::Default);
        self.line.display = display;
    }

    /// Append hints to the display buffer. Returns the change in display
    /// columns the inline continuation contributes (can be negative when a
    /// candidate list is shown without an inline selection).
    pub(crate) fn handle_hints(&mut self, pi: &Prompt, action: HintAction) -> i64 {
        if self.options.no_color || self.hinter.is_none() || action == HintAction::Skip {
            return 0;
        }
        if self.line.pos != self.line.len() {
            return 0;
        }
        self.line.hint.clear();
        if action == HintAction::Regenerate {
            self.line.hint_selection = NO_HINT;
        }

        let mut color = Color::Gray;
        let mut context_len = self.context_length();
        let text = self.line.utf8_prefix(self.line.pos);
        let hints: Vec<Vec<char>> = match self.hinter.as_mut() {
            Some(hook) => hook(&text, &mut context_len, &mut color)
                .into_iter()
                .map(|hint| hint.chars().collect())
                .collect(),
            None => Vec::new(),
        };
        let context_len = context_len.min(self.line.pos);
        let count = hints.len();
        let mut inline_len: i64 = 0;

        if count == 1 {
            let hint = &hints[0];
            inline_len = hint.len() as i64;
            let mut display = std::mem::take(&mut self.line.display);
            push_color(&mut display, color);
            for &ch in &hint[context_len.min(hint.len())..] {
                display.push(ch);
            }
            push_color(&mut display, Color::Default);
            self.line.display = display;
            self.line.hint = hint.clone();
        } else if self.options.max_hint_rows > 0 && count > 0 {
            let start_col = pi.indentation + self.line.pos - context_len;
            let max_col = pi.screen_cols;

            if self.line.hint_selection < NO_HINT {
                self.line.hint_selection = count as i32 - 1;
            } else if self.line.hint_selection >= count as i32 {
                self.line.hint_selection = NO_HINT;
            }

            let mut display = std::mem::take(&mut self.line.display);
            push_color(&mut display, color);
            if self.line.hint_selection != NO_HINT {
                let hint = &hints[self.line.hint_selection as usize];
                let room = max_col as i64 - start_col as i64 - self.line.len() as i64;
                inline_len = (hint.len() as i64).min(room);
                let end = inline_len.max(0) as usize;
                for &ch in hint[..end.min(hint.len())].iter().skip(context_len) {
                    display.push(ch);
                }
                self.line.hint = hint.clone();
            }
            push_color(&mut display, Color::Default);

            for hint_row in 0..count.min(self.options.max_hint_rows) {
                display.push('\n');
                let mut col = 0;
                while col < start_col && col < max_col {
                    display.push(' ');
                    col += 1;
                }
                push_color(&mut display, color);
                for i in (self.line.pos - context_len)..self.line.pos {
                    if col >= max_col {
                        break;
                    }
                    display.push(self.line.char_at(i));
                    col += 1;
                }
                let mut hint_no = hint_row as i32 + self.line.hint_selection + 1;
                if hint_no == count as i32 {
                    continue;
                }
                if hint_no > count as i32 {
                    hint_no -= 1;
                }
                let hint = &hints[hint_no as usize % count];
                for &ch in hint.iter().skip(context_len) {
                    if col >= max_col {
                        break;
                    }
                    display.push(ch);
                    col += 1;
                }
                push_color(&mut display, Color::Default);
            }
            self.line.display = display;
        }

        inline_len - context_len as i64
    }
}
