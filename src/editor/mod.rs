//! The editor: configuration, callbacks, and the per-keystroke edit loop.

mod complete;
mod highlight;
mod refresh;
mod search;

use std::io;

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::EnvConfig;
use crate::core::history::History;
use crate::core::keys::{
    ctrl_key, is_control_char, meta_key, normalize_ctrl, CTRL, DELETE_KEY, DOWN_KEY, END_KEY,
    HOME_KEY, LEFT_KEY, META, PAGE_DOWN_KEY, PAGE_UP_KEY, RIGHT_KEY, UP_KEY,
};
use crate::core::kill_ring::{KillAction, KillRing};
use crate::core::line::LineModel;
use crate::core::terminal::{ClearRegion, Color, Terminal};
use crate::core::text::{is_word_break, DEFAULT_BREAK_CHARS};
use crate::render::output::{OutputGate, TermCmd};
use crate::render::prompt::{Prompt, SearchDirection};

#[cfg(unix)]
use crate::platform::PosixTerminal;

/// Why `input()` came back without a line.
#[derive(Debug, Error)]
pub enum ReadlineError {
    /// `Ctrl-C`.
    #[error("interrupted")]
    Interrupted,
    /// `Ctrl-D` on an empty line, or end of stream off a TTY.
    #[error("end of input")]
    Eof,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Completion callback: receives the UTF-8 input up to the cursor and the
/// context length in code points (adjustable), returns candidate words.
pub type CompletionHook = Box<dyn FnMut(&str, &mut usize) -> Vec<String>>;

/// Hint callback: like completion, plus an adjustable display color.
pub type HintHook = Box<dyn FnMut(&str, &mut usize, &mut Color) -> Vec<String>>;

/// Highlight callback: overwrites one color per code point of the line.
pub type HighlightHook = Box<dyn FnMut(&str, &mut Vec<Color>)>;

/// How a refresh treats the hint state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintAction {
    /// Redraw hints with the current selection.
    Repaint,
    /// Leave hints out of this refresh.
    Skip,
    /// Recompute hints and drop the selection.
    Regenerate,
}

#[derive(Debug)]
pub(crate) struct Options {
    pub break_chars: String,
    pub completion_cutoff: usize,
    pub max_hint_rows: usize,
    pub double_tab_completion: bool,
    pub complete_on_empty: bool,
    pub beep_on_ambiguous: bool,
    pub no_color: bool,
}

impl Options {
    fn from_env(config: &EnvConfig) -> Self {
        Self {
            break_chars: DEFAULT_BREAK_CHARS.to_string(),
            completion_cutoff: 100,
            max_hint_rows: 4,
            double_tab_completion: false,
            complete_on_empty: true,
            beep_on_ambiguous: false,
            no_color: config.no_color,
        }
    }
}

/// What a keystroke asks the edit loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditAction {
    MoveHome,
    MoveEnd,
    MoveLeft,
    MoveRight,
    WordLeft,
    WordRight,
    EraseLeft,
    EraseRight,
    EraseRightOrEof,
    KillWordLeft,
    KillWordRight,
    KillToWhitespaceLeft,
    KillLineLeft,
    KillLineRight,
    Yank,
    YankPop,
    Transpose,
    CapitalizeWord,
    LowercaseWord,
    UppercaseWord,
    HistoryPrevious,
    HistoryNext,
    HistoryFirst,
    HistoryLast,
    PrefixSearchOlder,
    PrefixSearchNewer,
    SearchBackward,
    SearchForward,
    ClearScreen,
    Abort,
    Accept,
    Suspend,
    HintPrevious,
    HintNext,
    Complete,
    /// Anything else: a printable code point to insert, or noise to beep at.
    Other(i32),
}

fn action_for(key: i32) -> EditAction {
    use EditAction::*;
    match key {
        k if k == ctrl_key('A') || k == HOME_KEY => MoveHome,
        k if k == ctrl_key('E') || k == END_KEY => MoveEnd,
        k if k == ctrl_key('B') || k == LEFT_KEY => MoveLeft,
        k if k == ctrl_key('F') || k == RIGHT_KEY => MoveRight,
        k if k == meta_key('b')
            || k == meta_key('B')
            || k == (CTRL | LEFT_KEY)
            || k == (META | LEFT_KEY) =>
        {
            WordLeft
        }
        k if k == meta_key('f')
            || k == meta_key('F')
            || k == (CTRL | RIGHT_KEY)
            || k == (META | RIGHT_KEY) =>
        {
            WordRight
        }
        k if k == ctrl_key('H') => EraseLeft,
        k if k == 127 || k == DELETE_KEY => EraseRight,
        k if k == ctrl_key('D') => EraseRightOrEof,
        k if k == (META | ctrl_key('H')) => KillWordLeft,
        k if k == meta_key('d') || k == meta_key('D') => KillWordRight,
        k if k == ctrl_key('W') => KillToWhitespaceLeft,
        k if k == ctrl_key('U') => KillLineLeft,
        k if k == ctrl_key('K') => KillLineRight,
        k if k == ctrl_key('Y') => Yank,
        k if k == meta_key('y') || k == meta_key('Y') => YankPop,
        k if k == ctrl_key('T') => Transpose,
        k if k == meta_key('c') || k == meta_key('C') => CapitalizeWord,
        k if k == meta_key('l') || k == meta_key('L') => LowercaseWord,
        k if k == meta_key('u') || k == meta_key('U') => UppercaseWord,
        k if k == ctrl_key('P') || k == UP_KEY => HistoryPrevious,
        k if k == ctrl_key('N') || k == DOWN_KEY => HistoryNext,
        k if k == meta_key('<') || k == PAGE_UP_KEY => HistoryFirst,
        k if k == meta_key('>') || k == PAGE_DOWN_KEY => HistoryLast,
        k if k == meta_key('p') || k == meta_key('P') => PrefixSearchOlder,
        k if k == meta_key('n') || k == meta_key('N') => PrefixSearchNewer,
        k if k == ctrl_key('R') => SearchBackward,
        k if k == ctrl_key('S') => SearchForward,
        k if k == ctrl_key('L') => ClearScreen,
        k if k == ctrl_key('C') => Abort,
        k if k == ctrl_key('J') || k == ctrl_key('M') => Accept,
        k if k == ctrl_key('Z') => Suspend,
        k if k == (CTRL | UP_KEY) => HintPrevious,
        k if k == (CTRL | DOWN_KEY) => HintNext,
        k if k == ctrl_key('I') => Complete,
        other => Other(other),
    }
}

enum Next {
    Continue,
    Return,
    Bail(ReadlineError),
}

pub struct Editor<T: Terminal> {
    pub(crate) term: T,
    pub(crate) gate: OutputGate,
    pub(crate) line: LineModel,
    pub(crate) history: History,
    pub(crate) kill_ring: KillRing,
    pub(crate) options: Options,
    pub(crate) completion: Option<CompletionHook>,
    pub(crate) hinter: Option<HintHook>,
    pub(crate) highlighter: Option<HighlightHook>,
    preload: Option<String>,
    warning: Option<String>,
    pub(crate) last_search_text: Vec<char>,
}

#[cfg(unix)]
impl Editor<PosixTerminal> {
    /// An editor on the process's controlling terminal.
    pub fn new() -> Self {
        let config = EnvConfig::from_env();
        let term = PosixTerminal::with_config(&config);
        Self::with_terminal_and_config(term, &config)
    }
}

#[cfg(unix)]
impl Default for Editor<PosixTerminal> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Terminal> Editor<T> {
    /// An editor on a caller-supplied terminal.
    pub fn with_terminal(term: T) -> Self {
        Self::with_terminal_and_config(term, &EnvConfig::from_env())
    }

    fn with_terminal_and_config(term: T, config: &EnvConfig) -> Self {
        Self {
            term,
            gate: OutputGate::new(),
            line: LineModel::new(),
            history: History::new(),
            kill_ring: KillRing::new(),
            options: Options::from_env(config),
            completion: None,
            hinter: None,
            highlighter: None,
            preload: None,
            warning: None,
            last_search_text: Vec::new(),
        }
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    pub fn set_completion_callback(&mut self, hook: CompletionHook) {
        self.completion = Some(hook);
    }

    pub fn set_hint_callback(&mut self, hook: HintHook) {
        self.hinter = Some(hook);
    }

    pub fn set_highlighter_callback(&mut self, hook: HighlightHook) {
        self.highlighter = Some(hook);
    }

    pub fn set_word_break_characters(&mut self, break_chars: &str) {
        self.options.break_chars = break_chars.to_string();
    }

    pub fn set_completion_count_cutoff(&mut self, cutoff: usize) {
        self.options.completion_cutoff = cutoff;
    }

    pub fn set_max_hint_rows(&mut self, rows: usize) {
        self.options.max_hint_rows = rows;
    }

    pub fn set_double_tab_completion(&mut self, on: bool) {
        self.options.double_tab_completion = on;
    }

    pub fn set_complete_on_empty(&mut self, on: bool) {
        self.options.complete_on_empty = on;
    }

    pub fn set_beep_on_ambiguous_completion(&mut self, on: bool) {
        self.options.beep_on_ambiguous = on;
    }

    pub fn set_no_color(&mut self, on: bool) {
        self.options.no_color = on;
    }

    pub fn set_max_history_size(&mut self, max_size: usize) {
        self.history.set_max_size(max_size);
    }

    pub fn history_add(&mut self, line: &str) {
        self.history.add(line);
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    pub fn history_line(&self, index: usize) -> &str {
        self.history.line(index)
    }

    /// Seed the next `input()` call. CR is dropped, runs of newline/tab
    /// collapse to one space, and other control characters become spaces;
    /// the latter arms a one-shot warning printed before the next prompt.
    pub fn set_preload(&mut self, text: &str) {
        let mut cleaned = String::with_capacity(text.len());
        let mut stripped = false;
        let mut pending_ws = false;
        for ch in text.chars() {
            if ch == '\r' {
                continue;
            }
            if ch == '\n' || ch == '\t' {
                pending_ws = true;
                continue;
            }
            if pending_ws {
                cleaned.push(' ');
                pending_ws = false;
            }
            if (ch as u32) < 32 {
                cleaned.push(' ');
                stripped = true;
            } else {
                cleaned.push(ch);
            }
        }
        if pending_ws {
            cleaned.push(' ');
        }
        self.preload = Some(cleaned);
        if stripped {
            self.warning = Some(
                " [Edited line: control characters were converted to spaces]\n".to_string(),
            );
        }
    }

    pub fn clear_screen(&mut self) {
        self.term.clear(ClearRegion::Whole);
    }

    /// Read one line. Returns the accepted text without its trailing
    /// newline; `Ctrl-C` and end-of-input surface as errors. Raw mode is
    /// released on every path out.
    pub fn input(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        if !self.term.is_tty() {
            return self.read_plain();
        }
        if let Some(warning) = self.warning.take() {
            self.term.write_text(&warning);
        }
        let mut pi = Prompt::new(prompt, self.term.columns());
        if self.term.is_unsupported() {
            debug!("unsupported terminal, falling back to a plain read");
            let text: String = pi.text.iter().collect();
            self.term.write_text(&text);
            return self.read_plain();
        }

        self.term.enable_raw_mode()?;
        self.line.reset();
        if let Some(text) = self.preload.take() {
            self.line.assign_str(&text);
            self.line.pos = self.line.len();
            self.line.prefix = self.line.len();
        }
        let result = self.edit_loop(&mut pi);
        let restored = self.term.disable_raw_mode();
        match result {
            Ok(()) => {
                restored?;
                self.term.write_text("\n");
                Ok(self.line.to_utf8())
            }
            Err(err) => {
                // the edit loop's error wins over a restore failure
                let _ = restored;
                Err(err)
            }
        }
    }

    fn read_plain(&mut self) -> Result<String, ReadlineError> {
        if let Some(text) = self.preload.take() {
            return Ok(text);
        }
        match self.term.read_plain_line()? {
            Some(line) => Ok(line),
            None => Err(ReadlineError::Eof),
        }
    }

    pub(crate) fn flush_gate(&mut self) {
        let Self { gate, term, .. } = self;
        gate.flush(term);
    }

    fn write_prompt(&mut self, pi: &Prompt) {
        pi.write(&mut self.gate);
        if pi.indentation == 0 && pi.extra_lines > 0 {
            // terminals do not advance past the rightmost column on their own
            self.gate.push(TermCmd::Newline);
        }
        self.flush_gate();
    }

    fn edit_loop(&mut self, pi: &mut Prompt) -> Result<(), ReadlineError> {
        // the working entry: history's last slot always mirrors this line
        let text = self.line.to_utf8();
        self.history.add(&text);
        self.history.reset_pos(None);

        self.write_prompt(pi);
        pi.cursor_row_offset = pi.extra_lines;

        self.kill_ring.last_action = KillAction::Other;

        // a keystroke handed back by search or completion runs before the
        // next terminal read
        let mut pending: i32 = -1;

        if !self.line.is_empty() {
            self.refresh_line(pi, HintAction::Regenerate);
        }

        loop {
            let raw = if pending != -1 {
                std::mem::replace(&mut pending, -1)
            } else {
                let key = self.term.read_key()?;
                if key == 0 && self.term.take_resize() {
                    pi.screen_cols = self.term.columns();
                    let data = self.line.chars().to_vec();
                    let pos = self.line.pos;
                    self.dynamic_refresh(pi, &data, pos);
                    continue;
                }
                key
            };
            let c = normalize_ctrl(raw);
            trace!(key = c, "dispatch");

            if c == 0 {
                // end of stream mid-line: hand back what we have
                self.history.drop_last();
                return Ok(());
            }
            if c == -1 {
                self.refresh_line(pi, HintAction::Regenerate);
                continue;
            }
            if c == -2 {
                self.write_prompt(pi);
                pi.cursor_row_offset = pi.extra_lines;
                self.refresh_line(pi, HintAction::Regenerate);
                continue;
            }

            let mut update_prefix = true;
            let next = self.dispatch(pi, c, &mut pending, &mut update_prefix)?;
            if update_prefix {
                self.line.prefix = self.line.pos;
            }
            match next {
                Next::Continue => {}
                Next::Return => return Ok(()),
                Next::Bail(err) => return Err(err),
            }
        }
    }

    fn dispatch(
        &mut self,
        pi: &mut Prompt,
        c: i32,
        pending: &mut i32,
        update_prefix: &mut bool,
    ) -> Result<Next, ReadlineError> {
        use EditAction::*;
        match action_for(c) {
            MoveHome => {
                self.kill_ring.last_action = KillAction::Other;
                self.line.pos = 0;
                self.refresh_line(pi, HintAction::Regenerate);
            }
            MoveEnd => {
                self.kill_ring.last_action = KillAction::Other;
                self.line.pos = self.line.len();
                self.refresh_line(pi, HintAction::Regenerate);
            }
            MoveLeft => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos > 0 {
                    self.line.pos -= 1;
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            MoveRight => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos < self.line.len() {
                    self.line.pos += 1;
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            WordLeft => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos > 0 {
                    self.line.pos = self.word_left_from(self.line.pos);
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            WordRight => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos < self.line.len() {
                    self.line.pos = self.word_right_from(self.line.pos);
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            EraseLeft => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos > 0 {
                    self.history.reset_recall_most_recent();
                    self.line.pos -= 1;
                    self.line.erase(self.line.pos);
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            EraseRight => {
                self.kill_ring.last_action = KillAction::Other;
                if !self.line.is_empty() && self.line.pos < self.line.len() {
                    self.history.reset_recall_most_recent();
                    self.line.erase(self.line.pos);
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            EraseRightOrEof => {
                self.kill_ring.last_action = KillAction::Other;
                if !self.line.is_empty() && self.line.pos < self.line.len() {
                    self.history.reset_recall_most_recent();
                    self.line.erase(self.line.pos);
                    self.refresh_line(pi, HintAction::Regenerate);
                } else if self.line.is_empty() {
                    self.history.drop_last();
                    return Ok(Next::Bail(ReadlineError::Eof));
                }
            }
            KillWordLeft => {
                if self.line.pos > 0 {
                    self.history.reset_recall_most_recent();
                    let start = self.line.pos;
                    self.line.pos = self.word_left_from(start);
                    let killed = self.line.chars()[self.line.pos..start].to_vec();
                    self.kill_ring.kill(&killed, false);
                    let at = self.line.pos;
                    self.line.erase_range(at, start - at);
                    self.refresh_line(pi, HintAction::Regenerate);
                }
                self.kill_ring.last_action = KillAction::Kill;
            }
            KillWordRight => {
                if self.line.pos < self.line.len() {
                    self.history.reset_recall_most_recent();
                    let end = self.word_right_from(self.line.pos);
                    let killed = self.line.chars()[self.line.pos..end].to_vec();
                    self.kill_ring.kill(&killed, true);
                    let at = self.line.pos;
                    self.line.erase_range(at, end - at);
                    self.refresh_line(pi, HintAction::Regenerate);
                }
                self.kill_ring.last_action = KillAction::Kill;
            }
            KillToWhitespaceLeft => {
                if self.line.pos > 0 {
                    self.history.reset_recall_most_recent();
                    let start = self.line.pos;
                    let mut at = self.line.pos;
                    while at > 0 && self.line.char_at(at - 1) == ' ' {
                        at -= 1;
                    }
                    while at > 0 && self.line.char_at(at - 1) != ' ' {
                        at -= 1;
                    }
                    let killed = self.line.chars()[at..start].to_vec();
                    self.kill_ring.kill(&killed, false);
                    self.line.erase_range(at, start - at);
                    self.line.pos = at;
                    self.refresh_line(pi, HintAction::Regenerate);
                }
                self.kill_ring.last_action = KillAction::Kill;
            }
            KillLineLeft => {
                if self.line.pos > 0 {
                    self.history.reset_recall_most_recent();
                    let killed = self.line.chars()[..self.line.pos].to_vec();
                    self.kill_ring.kill(&killed, false);
                    let count = self.line.pos;
                    self.line.erase_range(0, count);
                    self.line.pos = 0;
                    self.refresh_line(pi, HintAction::Regenerate);
                }
                self.kill_ring.last_action = KillAction::Kill;
            }
            KillLineRight => {
                let killed = self.line.chars()[self.line.pos..].to_vec();
                self.kill_ring.kill(&killed, true);
                let at = self.line.pos;
                let count = self.line.len() - at;
                self.line.erase_range(at, count);
                self.refresh_line(pi, HintAction::Regenerate);
                self.kill_ring.last_action = KillAction::Kill;
                self.history.reset_recall_most_recent();
            }
            Yank => {
                self.history.reset_recall_most_recent();
                match self.kill_ring.yank() {
                    Some(text) => {
                        let at = self.line.pos;
                        self.line.insert_slice(at, &text);
                        self.line.pos += text.len();
                        self.refresh_line(pi, HintAction::Regenerate);
                        self.kill_ring.last_action = KillAction::Yank;
                        self.kill_ring.last_yank_size = text.len();
                    }
                    None => self.term.beep(),
                }
            }
            YankPop => {
                if self.kill_ring.last_action == KillAction::Yank {
                    self.history.reset_recall_most_recent();
                    if let Some(text) = self.kill_ring.yank_pop() {
                        self.line.pos -= self.kill_ring.last_yank_size;
                        let at = self.line.pos;
                        self.line.erase_range(at, self.kill_ring.last_yank_size);
                        self.line.insert_slice(at, &text);
                        self.line.pos += text.len();
                        self.kill_ring.last_yank_size = text.len();
                        self.refresh_line(pi, HintAction::Regenerate);
                        return Ok(Next::Continue);
                    }
                }
                self.term.beep();
            }
            Transpose => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos > 0 && self.line.len() > 1 {
                    self.history.reset_recall_most_recent();
                    let left = if self.line.pos == self.line.len() {
                        self.line.pos - 2
                    } else {
                        self.line.pos - 1
                    };
                    self.line.swap(left, left + 1);
                    if self.line.pos != self.line.len() {
                        self.line.pos += 1;
                    }
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            CapitalizeWord => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos < self.line.len() {
                    self.history.reset_recall_most_recent();
                    self.skip_breaks_right();
                    if self.line.pos < self.line.len()
                        && !self.is_break(self.line.char_at(self.line.pos))
                    {
                        let ch = self.line.char_at(self.line.pos);
                        if ch.is_ascii_lowercase() {
                            self.line.set_char(self.line.pos, ch.to_ascii_uppercase());
                        }
                        self.line.pos += 1;
                    }
                    self.lowercase_to_word_end();
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            LowercaseWord => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos < self.line.len() {
                    self.history.reset_recall_most_recent();
                    self.skip_breaks_right();
                    self.lowercase_to_word_end();
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            UppercaseWord => {
                self.kill_ring.last_action = KillAction::Other;
                if self.line.pos < self.line.len() {
                    self.history.reset_recall_most_recent();
                    self.skip_breaks_right();
                    while self.line.pos < self.line.len()
                        && !self.is_break(self.line.char_at(self.line.pos))
                    {
                        let ch = self.line.char_at(self.line.pos);
                        if ch.is_ascii_lowercase() {
                            self.line.set_char(self.line.pos, ch.to_ascii_uppercase());
                        }
                        self.line.pos += 1;
                    }
                    self.refresh_line(pi, HintAction::Regenerate);
                }
            }
            HistoryPrevious => self.recall(pi, true),
            HistoryNext => self.recall(pi, false),
            HistoryFirst => self.recall_jump(pi, true),
            HistoryLast => self.recall_jump(pi, false),
            PrefixSearchOlder => {
                self.common_prefix_recall(pi, true);
                *update_prefix = false;
            }
            PrefixSearchNewer => {
                self.common_prefix_recall(pi, false);
                *update_prefix = false;
            }
            SearchBackward => {
                *pending = self.incremental_search(pi, SearchDirection::Backward)?;
            }
            SearchForward => {
                *pending = self.incremental_search(pi, SearchDirection::Forward)?;
            }
            ClearScreen => {
                self.term.clear(ClearRegion::Whole);
                self.write_prompt(pi);
                pi.cursor_row_offset = pi.extra_lines;
                self.refresh_line(pi, HintAction::Regenerate);
            }
            Abort => {
                self.kill_ring.last_action = KillAction::Other;
                self.history.reset_recall_most_recent();
                self.history.drop_last();
                // one last refresh with the cursor at end of line, so the
                // next prompt does not land on top of the input
                self.line.pos = self.line.len();
                self.refresh_line(pi, HintAction::Skip);
                self.term.write_text("^C\r\n");
                debug!("interrupted");
                return Ok(Next::Bail(ReadlineError::Interrupted));
            }
            Accept => {
                self.kill_ring.last_action = KillAction::Other;
                self.line.pos = self.line.len();
                self.refresh_line(pi, HintAction::Skip);
                self.history.commit_index();
                self.history.drop_last();
                return Ok(Next::Return);
            }
            Suspend => {
                self.term.suspend()?;
                self.write_prompt(pi);
                pi.cursor_row_offset = pi.extra_lines;
                self.refresh_line(pi, HintAction::Regenerate);
            }
            HintPrevious => {
                if !self.options.no_color {
                    self.kill_ring.last_action = KillAction::Other;
                    self.line.hint_selection -= 1;
                    self.refresh_line(pi, HintAction::Repaint);
                }
            }
            HintNext => {
                if !self.options.no_color {
                    self.kill_ring.last_action = KillAction::Other;
                    self.line.hint_selection += 1;
                    self.refresh_line(pi, HintAction::Repaint);
                }
            }
            Complete => {
                if self.completion.is_some()
                    && (self.options.complete_on_empty || self.line.pos > 0)
                {
                    self.kill_ring.last_action = KillAction::Other;
                    self.history.reset_recall_most_recent();
                    let key = self.complete_line(pi)?;
                    if key != 0 {
                        *pending = key;
                    }
                } else {
                    return Ok(self.insert_character(pi, c));
                }
            }
            Other(key) => return Ok(self.insert_character(pi, key)),
        }
        Ok(Next::Continue)
    }

    /// The fast path writes a single code point without a full refresh when
    /// nothing else on screen can change.
    fn insert_character(&mut self, pi: &mut Prompt, key: i32) -> Next {
        self.kill_ring.last_action = KillAction::Other;
        self.history.reset_recall_most_recent();
        let ch = match key {
            k if k & (META | CTRL) != 0 || is_control_char(k) => None,
            k => u32::try_from(k).ok().and_then(char::from_u32),
        };
        let Some(ch) = ch else {
            // unknown Ctrl and/or Meta keys; control characters are not
            // inserted
            self.term.beep();
            return Next::Continue;
        };
        let at = self.line.pos;
        self.line.insert_char(at, ch);
        self.line.pos += 1;
        let input_cols = self.line.total_width();
        if self.options.no_color
            || (self.highlighter.is_none()
                && self.hinter.is_none()
                && pi.indentation + input_cols < pi.screen_cols)
        {
            if input_cols > pi.previous_input_cols {
                pi.previous_input_cols = input_cols;
            }
            self.term.write_chars(&[ch]);
        } else {
            self.refresh_line(pi, HintAction::Regenerate);
        }
        Next::Continue
    }

    fn recall(&mut self, pi: &mut Prompt, up: bool) {
        self.kill_ring.last_action = KillAction::Other;
        if self.history.is_last() {
            let text = self.line.to_utf8();
            self.history.update_last(&text);
        }
        if self.history.is_empty() {
            return;
        }
        if !self.history.move_cursor(up) {
            return;
        }
        self.line.assign_str(&self.history.current().to_string());
        self.line.pos = self.line.len();
        self.refresh_line(pi, HintAction::Regenerate);
    }

    fn recall_jump(&mut self, pi: &mut Prompt, begin: bool) {
        self.kill_ring.last_action = KillAction::Other;
        if self.history.is_last() {
            let text = self.line.to_utf8();
            self.history.update_last(&text);
        }
        if self.history.is_empty() {
            return;
        }
        self.history.jump(begin);
        self.line.assign_str(&self.history.current().to_string());
        self.line.pos = self.line.len();
        self.refresh_line(pi, HintAction::Regenerate);
    }

    fn common_prefix_recall(&mut self, pi: &mut Prompt, older: bool) {
        self.kill_ring.last_action = KillAction::Other;
        let text = self.line.to_utf8();
        let prefix_cols = self.line.width_to(self.line.prefix);
        if self.history.common_prefix_search(&text, prefix_cols, older) {
            self.line.assign_str(&self.history.current().to_string());
            self.line.pos = self.line.len();
            self.refresh_line(pi, HintAction::Regenerate);
        }
    }

    pub(crate) fn is_break(&self, ch: char) -> bool {
        is_word_break(&self.options.break_chars, ch)
    }

    /// Number of trailing code points since the last break character; what a
    /// completion or hint callback sees as the word being typed.
    pub(crate) fn context_length(&self) -> usize {
        let mut start = self.line.pos;
        while start > 0 && !self.is_break(self.line.char_at(start - 1)) {
            start -= 1;
        }
        self.line.pos - start
    }

    fn word_left_from(&self, from: usize) -> usize {
        let mut at = from;
        while at > 0 && self.is_break(self.line.char_at(at - 1)) {
            at -= 1;
        }
        while at > 0 && !self.is_break(self.line.char_at(at - 1)) {
            at -= 1;
        }
        at
    }

    fn word_right_from(&self, from: usize) -> usize {
        let mut at = from;
        while at < self.line.len() && self.is_break(self.line.char_at(at)) {
            at += 1;
        }
        while at < self.line.len() && !self.is_break(self.line.char_at(at)) {
            at += 1;
        }
        at
    }

    fn skip_breaks_right(&mut self) {
        while self.line.pos < self.line.len() && self.is_break(self.line.char_at(self.line.pos)) {
            self.line.pos += 1;
        }
    }

    fn lowercase_to_word_end(&mut self) {
        while self.line.pos < self.line.len() && !self.is_break(self.line.char_at(self.line.pos)) {
            let ch = self.line.char_at(self.line.pos);
            if ch.is_ascii_uppercase() {
                self.line.set_char(self.line.pos, ch.to_ascii_lowercase());
            }
            self.line.pos += 1;
        }
    }
}
