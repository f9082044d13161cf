//! Environment configuration.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// `NO_COLOR` convention: any non-empty value disables colors and hints.
    pub no_color: bool,
    /// Mirror every terminal write to this file, for escape-sequence
    /// debugging.
    pub write_log: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            no_color: env_present("NO_COLOR"),
            write_log: env_string_opt("TIDELINE_WRITE_LOG").map(PathBuf::from),
        }
    }
}

fn env_present(key: &str) -> bool {
    env::var(key).map(|value| !value.is_empty()).unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
