//! Application configuration.
//!
//! Layers, later wins: built-in defaults, `typeahead.toml` (platform config
//! dir or `--config`), `TYPEAHEAD_*` environment variables (a `.env` file is
//! honoured), then CLI flags applied by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/autocomplete";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SUGGEST_LIMIT: usize = 10;
pub const DEFAULT_TOP_LIMIT: usize = 10;

const CONFIG_FILE_NAME: &str = "typeahead.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the suggestion service.
    pub api_url: String,
    /// Per-request transport timeout.
    pub request_timeout_ms: u64,
    /// Quiet period between the last keystroke and the suggestion request.
    pub debounce_ms: u64,
    /// Maximum suggestions requested per prefix.
    pub suggest_limit: usize,
    /// Leaderboard size.
    pub top_limit: usize,
    /// Where interactive sessions write their log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            suggest_limit: DEFAULT_SUGGEST_LIMIT,
            top_limit: DEFAULT_TOP_LIMIT,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file (explicit path or platform default),
    /// then the environment.
    ///
    /// A missing default file is fine; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Override fields from `TYPEAHEAD_*` variables. Unparseable values are
    /// logged and ignored.
    pub fn apply_env(&mut self) {
        if let Ok(url) = dotenvy::var("TYPEAHEAD_API_URL") {
            self.api_url = url;
        }
        if let Some(ms) = env_number("TYPEAHEAD_TIMEOUT_MS") {
            self.request_timeout_ms = ms;
        }
        if let Some(ms) = env_number("TYPEAHEAD_DEBOUNCE_MS") {
            self.debounce_ms = ms;
        }
        if let Some(n) = env_number("TYPEAHEAD_SUGGEST_LIMIT") {
            self.suggest_limit = n;
        }
        if let Some(n) = env_number("TYPEAHEAD_TOP_LIMIT") {
            self.top_limit = n;
        }
        if let Ok(dir) = dotenvy::var("TYPEAHEAD_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be positive".into(),
            ));
        }
        if self.suggest_limit == 0 || self.top_limit == 0 {
            return Err(ConfigError::Invalid(
                "suggest_limit and top_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = dotenvy::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "typeahead", "typeahead")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn default_log_dir() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from("logs"),
        |dirs| dirs.data_dir().join("logs"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, val: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::set_var(key, val) };
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(v) => unsafe { std::env::set_var(self.key, v) },
                None => unsafe { std::env::remove_var(self.key) },
            }
        }
    }

    #[test]
    fn defaults_match_reference_service() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    #[serial]
    fn file_values_fill_in_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typeahead.toml");
        fs::write(&path, "api_url = \"http://example.test/api\"\ndebounce_ms = 150\n").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.api_url, "http://example.test/api");
        assert_eq!(cfg.debounce_ms, 150);
        assert_eq!(cfg.suggest_limit, DEFAULT_SUGGEST_LIMIT);
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typeahead.toml");
        fs::write(&path, "debounce_ms = 150\n").unwrap();
        let _debounce = EnvGuard::set("TYPEAHEAD_DEBOUNCE_MS", "75");
        let _limit = EnvGuard::set("TYPEAHEAD_TOP_LIMIT", "not-a-number");

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.debounce_ms, 75);
        assert_eq!(cfg.top_limit, DEFAULT_TOP_LIMIT);
    }

    #[test]
    #[serial]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typeahead.toml");
        fs::write(&path, "debounce_ms = \"soon\"").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_limits_are_invalid() {
        let cfg = AppConfig {
            suggest_limit: 0,
            ..AppConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
