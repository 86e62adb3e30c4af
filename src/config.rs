//! Environment configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub debug: bool,
    pub write_log: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug: env_flag("PROMPT_TUI_DEBUG"),
            write_log: env_string_opt("PROMPT_TUI_WRITE_LOG"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
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

#[cfg(test)]
mod tests {
    use super::EnvConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn defaults_are_off() {
        let _lock = env_lock();
        let _g1 = set_env_guard("PROMPT_TUI_DEBUG", None);
        let _g2 = set_env_guard("PROMPT_TUI_WRITE_LOG", None);

        let config = EnvConfig::from_env();
        assert!(!config.debug);
        assert!(config.write_log.is_none());
    }

    #[test]
    fn flags_set_to_one_enable() {
        let _lock = env_lock();
        let _g1 = set_env_guard("PROMPT_TUI_DEBUG", Some("1"));
        let _g2 = set_env_guard("PROMPT_TUI_WRITE_LOG", Some("/tmp/prompt_tui.log"));

        let config = EnvConfig::from_env();
        assert!(config.debug);
        assert_eq!(config.write_log.as_deref(), Some("/tmp/prompt_tui.log"));
    }

    #[test]
    fn empty_write_log_is_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("PROMPT_TUI_WRITE_LOG", Some(""));
        let config = EnvConfig::from_env();
        assert!(config.write_log.is_none());
    }
}
