//! Debug logging helpers.
//!
//! Enabled only when `PROMPT_TUI_DEBUG=1` and `PROMPT_TUI_WRITE_LOG` names a
//! writable path; otherwise every call is a no-op. Write failures are
//! ignored so a full disk never breaks input handling.

use std::fs::OpenOptions;
use std::io::Write;

use crate::config::EnvConfig;

#[derive(Debug, Default)]
pub struct DebugLogger {
    path: Option<String>,
}

impl DebugLogger {
    pub fn from_env() -> Self {
        let config = EnvConfig::from_env();
        let path = if config.debug { config.write_log } else { None };
        Self { path }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn log(&self, line: &str) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}
