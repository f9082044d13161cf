//! Incremental history search: the overlay prompt takes over the keyboard
//! until the user accepts a match, edits it, or cancels.

use tracing::debug;

use crate::core::keys::{ctrl_key, is_control_char, normalize_ctrl, CTRL, META};
use crate::core::terminal::Terminal;
use crate::editor::{action_for, EditAction, Editor, HintAction, ReadlineError};
use crate::render::prompt::{Prompt, SearchDirection, SearchPrompt};

impl<T: Terminal> Editor<T> {
    /// Run the search loop. Returns the keystroke that ended it, re-injected
    /// into the outer edit loop (`-1` when the search was cancelled).
    pub(crate) fn incremental_search(
        &mut self,
        pi: &mut Prompt,
        direction: SearchDirection,
    ) -> Result<i32, ReadlineError> {
        if self.history.is_empty() {
            self.term.beep();
            return Ok(-1);
        }
        if self.history.is_last() {
            let text = self.line.to_utf8();
            self.history.update_last(&text);
        }
        let mut line_position = self.line.pos as i64;

        // erase the current input, then keep the buffer around: it is the
        // first search candidate
        let saved = self.line.take_chars();
        self.refresh_line(pi, HintAction::Skip);
        self.line.assign_chars(&saved);

        let mut overlay = SearchPrompt::new(pi, direction);
        overlay.base.previous_prompt_cols = pi.previous_prompt_cols;
        overlay.base.previous_input_cols = pi.previous_input_cols;
        overlay.base.cursor_row_offset = pi.cursor_row_offset;
        debug!(?direction, "incremental search started");

        let data = self.line.chars().to_vec();
        self.dynamic_refresh(&mut overlay.base, &data, line_position.max(0) as usize);

        let mut key = 0;
        let mut keep_looping = true;
        let mut use_searched_line = true;
        let mut search_again = false;
        let mut active: Vec<char> = Vec::new();

        while keep_looping {
            key = normalize_ctrl(self.term.read_key()?);

            if key == 0 {
                if self.term.take_resize() {
                    overlay.base.screen_cols = self.term.columns();
                    let candidate = active.clone();
                    self.dynamic_refresh(
                        &mut overlay.base,
                        &candidate,
                        line_position.max(0) as usize,
                    );
                    continue;
                }
                // end of stream: leave the search without a result
                use_searched_line = false;
                break;
            }

            if key == ctrl_key('C') || key == ctrl_key('G') {
                keep_looping = false;
                use_searched_line = false;
                key = -1;
            } else if key == ctrl_key('L') {
                keep_looping = false;
                use_searched_line = false;
            } else if key == ctrl_key('R') || key == ctrl_key('S') {
                if overlay.search_text.is_empty() && !self.last_search_text.is_empty() {
                    overlay.search_text = self.last_search_text.clone();
                }
                let opposite = (overlay.direction == SearchDirection::Forward
                    && key == ctrl_key('R'))
                    || (overlay.direction == SearchDirection::Backward && key == ctrl_key('S'));
                if opposite {
                    overlay.direction = overlay.direction.flip();
                    overlay.update();
                } else {
                    search_again = true;
                }
            } else if key == ctrl_key('Z') {
                self.term.suspend()?;
                let candidate = active.clone();
                self.dynamic_refresh(
                    &mut overlay.base,
                    &candidate,
                    line_position.max(0) as usize,
                );
                continue;
            } else if key == ctrl_key('H') {
                if overlay.search_text.is_empty() {
                    self.term.beep();
                } else {
                    overlay.search_text.pop();
                    overlay.failed = false;
                    overlay.update();
                    let reset_to = match overlay.direction {
                        SearchDirection::Backward => self.history.len().saturating_sub(1),
                        SearchDirection::Forward => 0,
                    };
                    self.history.reset_pos(Some(reset_to));
                }
            } else if key == ctrl_key('Y') {
                // yank has no meaning over the overlay
            } else {
                match action_for(key) {
                    EditAction::MoveHome
                    | EditAction::MoveEnd
                    | EditAction::MoveLeft
                    | EditAction::MoveRight
                    | EditAction::WordLeft
                    | EditAction::WordRight
                    | EditAction::EraseRight
                    | EditAction::EraseRightOrEof
                    | EditAction::KillWordLeft
                    | EditAction::KillWordRight
                    | EditAction::KillToWhitespaceLeft
                    | EditAction::KillLineLeft
                    | EditAction::KillLineRight
                    | EditAction::YankPop
                    | EditAction::Transpose
                    | EditAction::HistoryPrevious
                    | EditAction::HistoryNext
                    | EditAction::HistoryFirst
                    | EditAction::HistoryLast
                    | EditAction::Accept => {
                        // keep the selected text, hand the key back
                        keep_looping = false;
                    }
                    EditAction::Other(k)
                        if k & (META | CTRL) == 0
                            && !is_control_char(k)
                            && u32::try_from(k)
                                .ok()
                                .and_then(char::from_u32)
                                .is_some() =>
                    {
                        let ch = char::from_u32(k as u32).expect("validated scalar");
                        overlay.search_text.push(ch);
                        overlay.failed = false;
                        overlay.update();
                    }
                    _ => self.term.beep(),
                }
            }

            if !keep_looping {
                break;
            }

            // search from the current history cursor and scan position
            active = self.history.current().chars().collect();
            if !overlay.search_text.is_empty() {
                let needle = overlay.search_text.clone();
                let step = overlay.direction.step();
                let mut found = false;
                let mut search_index = self.history.current_pos() as i64;
                let mut scan = line_position;
                if search_again {
                    scan += step;
                }
                search_again = false;
                loop {
                    while scan >= 0 && scan as usize + needle.len() <= active.len() {
                        let at = scan as usize;
                        if active[at..at + needle.len()] == needle[..] {
                            found = true;
                            break;
                        }
                        scan += step;
                    }
                    if found {
                        self.history.reset_pos(Some(search_index as usize));
                        line_position = scan;
                        break;
                    }
                    let can_advance = if step > 0 {
                        search_index + 1 < self.history.len() as i64
                    } else {
                        search_index > 0
                    };
                    if !can_advance {
                        self.term.beep();
                        overlay.failed = true;
                        overlay.update();
                        break;
                    }
                    search_index += step;
                    active = self
                        .history
                        .line(search_index as usize)
                        .chars()
                        .collect();
                    scan = if step > 0 {
                        0
                    } else {
                        active.len() as i64 - needle.len() as i64
                    };
                }
            }

            active = self.history.current().chars().collect();
            let cursor = (line_position.max(0) as usize).min(active.len());
            let candidate = active.clone();
            self.dynamic_refresh(&mut overlay.base, &candidate, cursor);
        }

        // hand the screen back: restore the prompt's last line, then redraw
        // the (possibly newly selected) input
        let mut restored = pi.last_line();
        restored.previous_prompt_cols = overlay.base.display_cols;
        restored.previous_input_cols = overlay.base.previous_input_cols;
        restored.cursor_row_offset = overlay.base.cursor_row_offset;

        if use_searched_line && !active.is_empty() {
            self.history.set_recall_most_recent();
            self.line.assign_chars(&active);
            let cursor = (line_position.max(0) as usize).min(self.line.len());
            self.line.pos = cursor;
            self.line.prefix = cursor;
        }
        let data = self.line.chars().to_vec();
        let pos = self.line.pos;
        self.dynamic_refresh(&mut restored, &data, pos);
        pi.previous_input_cols = self.line.total_width();
        pi.cursor_row_offset = pi.extra_lines + restored.cursor_row_offset;

        self.last_search_text = overlay.search_text.clone();
        debug!(ended_with = key, "incremental search finished");
        Ok(key)
    }
}
