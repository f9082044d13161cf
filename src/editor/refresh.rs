//! The refresh engine: reconciles the visible line with the model using
//! minimal cursor motion and a clear-to-end.

use crate::core::terminal::Terminal;
use crate::core::text::width::column_width;
use crate::editor::{Editor, HintAction};
use crate::render::output::TermCmd;
use crate::render::prompt::Prompt;
use crate::render::screen::advance;

impl<T: Terminal> Editor<T> {
    /// Redraw the input line after the prompt. The prompt itself is already
    /// on screen and is not repainted here.
    pub(crate) fn refresh_line(&mut self, pi: &mut Prompt, action: HintAction) {
        let (highlight_idx, indicate_error) = self.scan_matching_brace();
        self.assemble_display(highlight_idx, indicate_error);
        let hint_delta = self.handle_hints(pi, action);

        let end_cells = (self.line.total_width() as i64 + hint_delta).max(0) as usize;
        let (x_end, mut y_end) = advance(pi.indentation, 0, pi.screen_cols, end_cells);
        y_end += self.line.display.iter().filter(|&&ch| ch == '\n').count();

        let cursor_cells = self.line.width_to(self.line.pos);
        let (x_cursor, y_cursor) = advance(pi.indentation, 0, pi.screen_cols, cursor_cells);

        // back to the end of the prompt on its first input row
        self.gate.push(TermCmd::MoveUp(
            pi.cursor_row_offset.saturating_sub(pi.extra_lines),
        ));
        self.gate.push(TermCmd::ColumnAbs(pi.indentation + 1));
        self.gate.push(TermCmd::ClearToEnd);

        if self.options.no_color {
            self.gate.chars(self.line.chars());
        } else {
            self.gate.chars(&self.line.display);
        }

        // terminals do not wrap onto a fresh row until the next glyph
        if x_end == 0 && y_end > 0 {
            self.gate.push(TermCmd::Newline);
        }

        self.gate
            .push(TermCmd::MoveUp(y_end.saturating_sub(y_cursor)));
        self.gate.push(TermCmd::ColumnAbs(x_cursor + 1));
        self.flush_gate();

        pi.cursor_row_offset = pi.extra_lines + y_cursor;
    }

    /// Redraw the prompt and the given line together; used when the prompt
    /// itself changes (resize, the search overlay, and its exit).
    pub(crate) fn dynamic_refresh(&mut self, pi: &mut Prompt, data: &[char], pos: usize) {
        let cols = pi.screen_cols;
        let (x_prompt, y_prompt) = advance(0, 0, cols, pi.display_cols);
        pi.indentation = x_prompt;

        let (x_end, y_end) = advance(x_prompt, y_prompt, cols, column_width(data));
        let pos = pos.min(data.len());
        let (x_cursor, y_cursor) = advance(x_prompt, y_prompt, cols, column_width(&data[..pos]));

        self.gate.push(TermCmd::MoveUp(
            pi.cursor_row_offset.saturating_sub(pi.extra_lines),
        ));
        self.gate.push(TermCmd::ColumnAbs(1));
        self.gate.push(TermCmd::ClearToEnd);

        self.gate.chars(&pi.text);
        self.gate.chars(data);

        if x_end == 0 && y_end > 0 {
            self.gate.push(TermCmd::Newline);
        }

        self.gate
            .push(TermCmd::MoveUp(y_end.saturating_sub(y_cursor)));
        self.gate.push(TermCmd::ColumnAbs(x_cursor + 1));
        self.flush_gate();

        pi.previous_prompt_cols = pi.display_cols;
        pi.previous_input_cols = column_width(data);
        pi.cursor_row_offset = pi.extra_lines + y_cursor;
    }
}
