//! Shared building blocks: key encoding, text classification, the line
//! model, history, the kill ring, and the terminal interface.

pub mod history;
pub mod keys;
pub mod kill_ring;
pub mod line;
pub mod terminal;
pub mod text;
