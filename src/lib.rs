//! Interactive single-line editor for terminal programs.
//!
//! Reads a line from a raw-mode terminal with in-place editing, history
//! recall, incremental history search, tab completion, inline hints, and
//! syntax colorization.
//!
//! Invariant: single output gate — the refresh engine writes to the terminal
//! only through `render::output::OutputGate::flush(..)`.
//!
//! ```no_run
//! let mut editor = tideline::Editor::new();
//! while let Ok(line) = editor.input("> ") {
//!     editor.history_add(&line);
//!     println!("got: {line}");
//! }
//! ```

pub mod config;

pub mod core;
pub mod editor;
pub mod platform;
pub mod render;

// Editor and configuration
pub use crate::editor::{
    CompletionHook, Editor, HighlightHook, HintAction, HintHook, ReadlineError,
};

pub use crate::config::EnvConfig;

// Terminal interface and the POSIX implementation
pub use crate::core::terminal::{ansi_color, ClearRegion, Color, Terminal};
#[cfg(unix)]
pub use crate::platform::PosixTerminal;

// Key event encoding
pub use crate::core::keys::{
    ctrl_key, meta_key, normalize_ctrl, CTRL, DELETE_KEY, DOWN_KEY, END_KEY, HOME_KEY, LEFT_KEY,
    META, PAGE_DOWN_KEY, PAGE_UP_KEY, RIGHT_KEY, UP_KEY,
};

// Building blocks
pub use crate::core::history::History;
pub use crate::core::kill_ring::{KillAction, KillRing};
pub use crate::core::line::LineModel;
pub use crate::core::text::width::{char_width, column_width};
pub use crate::core::text::DEFAULT_BREAK_CHARS;
pub use crate::render::prompt::{Prompt, SearchDirection, SearchPrompt};
pub use crate::render::screen::advance;
