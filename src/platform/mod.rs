//! Platform terminal implementations.

#[cfg(unix)]
pub mod posix;

#[cfg(unix)]
pub use posix::PosixTerminal;
