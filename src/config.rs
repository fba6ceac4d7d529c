use std::path::PathBuf;
use std::time::Duration;

// Environment overrides, loaded after dotenvy has read any .env file
const ENV_LIB_DIR: &str = "DOTFILES_LIB_DIR";
const ENV_SENTINEL: &str = "DOTFILES_SENTINEL";
const ENV_INSTALL_LOG: &str = "DOTFILES_INSTALL_LOG";
const ENV_SCRIPT_DIR: &str = "DOTFILES_SCRIPT_DIR";
const ENV_SHELL: &str = "DOTFILES_SHELL";
const ENV_TICK_MS: &str = "DOTFILES_TICK_MS";
const ENV_KILL_ON_QUIT: &str = "DOTFILES_KILL_ON_QUIT";
const ENV_DEBUG_LOG: &str = "DOTFILES_DEBUG_LOG";

const DEFAULT_LIB_DIR: &str = "lib";
const DEFAULT_SENTINEL: &str = "lib/packages.sh";
const DEFAULT_LOG_NAME: &str = "install.log";
const DEFAULT_SHELL: &str = "bash";
const DEFAULT_TICK_MS: u64 = 100;

// What a forced quit does to a running installer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CancelPolicy {
    // Leave the installer running in its own process group
    #[default]
    Detach,
    // SIGTERM the installer's process group
    KillGroup,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub library_dir: PathBuf,
    pub sentinel: PathBuf,
    pub log_path: PathBuf,
    pub script_dir: PathBuf,
    pub shell: String,
    pub tick_rate: Duration,
    pub cancel_policy: CancelPolicy,
    pub debug_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_dir: PathBuf::from(DEFAULT_LIB_DIR),
            sentinel: PathBuf::from(DEFAULT_SENTINEL),
            log_path: default_log_path(),
            script_dir: std::env::temp_dir(),
            shell: DEFAULT_SHELL.to_string(),
            tick_rate: Duration::from_millis(DEFAULT_TICK_MS),
            cancel_policy: CancelPolicy::Detach,
            debug_log: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Builds settings from any key lookup, empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(dir) = get(ENV_LIB_DIR) {
            settings.sentinel = PathBuf::from(&dir).join("packages.sh");
            settings.library_dir = PathBuf::from(dir);
        }
        if let Some(sentinel) = get(ENV_SENTINEL) {
            settings.sentinel = PathBuf::from(sentinel);
        }
        if let Some(log) = get(ENV_INSTALL_LOG) {
            settings.log_path = PathBuf::from(log);
        }
        if let Some(dir) = get(ENV_SCRIPT_DIR) {
            settings.script_dir = PathBuf::from(dir);
        }
        if let Some(shell) = get(ENV_SHELL) {
            settings.shell = shell;
        }
        if let Some(ms) = get(ENV_TICK_MS).and_then(|value| value.trim().parse::<u64>().ok()) {
            settings.tick_rate = Duration::from_millis(ms.max(10));
        }
        if get(ENV_KILL_ON_QUIT).as_deref() == Some("1") {
            settings.cancel_policy = CancelPolicy::KillGroup;
        }
        settings.debug_log = get(ENV_DEBUG_LOG).map(PathBuf::from);

        settings
    }
}

fn default_log_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_LOG_NAME),
        None => std::env::temp_dir().join(DEFAULT_LOG_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_overrides() {
        let settings = settings_from(&[]);
        assert_eq!(settings.library_dir, PathBuf::from("lib"));
        assert_eq!(settings.sentinel, PathBuf::from("lib/packages.sh"));
        assert_eq!(settings.shell, "bash");
        assert_eq!(settings.tick_rate, Duration::from_millis(100));
        assert_eq!(settings.cancel_policy, CancelPolicy::Detach);
        assert!(settings.debug_log.is_none());
        assert!(settings.log_path.ends_with("install.log"));
    }

    #[test]
    fn lib_dir_moves_the_sentinel_with_it() {
        let settings = settings_from(&[("DOTFILES_LIB_DIR", "/opt/dots/lib")]);
        assert_eq!(settings.library_dir, PathBuf::from("/opt/dots/lib"));
        assert_eq!(settings.sentinel, PathBuf::from("/opt/dots/lib/packages.sh"));
    }

    #[test]
    fn explicit_overrides_apply() {
        let settings = settings_from(&[
            ("DOTFILES_SENTINEL", "lib/utils.sh"),
            ("DOTFILES_INSTALL_LOG", "/tmp/dots.log"),
            ("DOTFILES_SHELL", "/usr/bin/bash"),
            ("DOTFILES_TICK_MS", "1"),
            ("DOTFILES_KILL_ON_QUIT", "1"),
            ("DOTFILES_DEBUG_LOG", "/tmp/dots-debug.log"),
        ]);
        assert_eq!(settings.sentinel, PathBuf::from("lib/utils.sh"));
        assert_eq!(settings.log_path, PathBuf::from("/tmp/dots.log"));
        assert_eq!(settings.shell, "/usr/bin/bash");
        assert_eq!(settings.tick_rate, Duration::from_millis(10));
        assert_eq!(settings.cancel_policy, CancelPolicy::KillGroup);
        assert_eq!(settings.debug_log, Some(PathBuf::from("/tmp/dots-debug.log")));
    }

    #[test]
    fn invalid_or_empty_values_fall_back() {
        let settings = settings_from(&[
            ("DOTFILES_TICK_MS", "soon"),
            ("DOTFILES_SHELL", "  "),
            ("DOTFILES_KILL_ON_QUIT", "yes"),
        ]);
        assert_eq!(settings.tick_rate, Duration::from_millis(100));
        assert_eq!(settings.shell, "bash");
        assert_eq!(settings.cancel_policy, CancelPolicy::Detach);
    }
}
