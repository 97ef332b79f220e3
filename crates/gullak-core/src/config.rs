//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/gullak/config.toml)
//! 3. Environment variables (GULLAK_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "GULLAK";

fn default_advisor_timeout() -> u64 {
    30
}

fn default_notifications() -> bool {
    true
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Advisor service URL (optional; chat falls back when unset)
    #[serde(default)]
    pub advisor_url: Option<String>,

    /// Request timeout for advisor calls, in seconds
    #[serde(default = "default_advisor_timeout")]
    pub advisor_timeout_secs: u64,

    /// Whether bill-due notifications are emitted
    #[serde(default = "default_notifications")]
    pub notifications_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            advisor_url: None,
            advisor_timeout_secs: default_advisor_timeout(),
            notifications_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (GULLAK_DATA_DIR, GULLAK_ADVISOR_URL, ...)
    /// 2. Config file (~/.config/gullak/config.toml or GULLAK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // GULLAK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // GULLAK_ADVISOR_URL
        if let Ok(val) = std::env::var(format!("{}_ADVISOR_URL", ENV_PREFIX)) {
            self.advisor_url = if val.is_empty() { None } else { Some(val) };
        }

        // GULLAK_ADVISOR_TIMEOUT_SECS
        if let Ok(val) = std::env::var(format!("{}_ADVISOR_TIMEOUT_SECS", ENV_PREFIX)) {
            if let Ok(secs) = val.parse() {
                self.advisor_timeout_secs = secs;
            }
        }

        // GULLAK_NOTIFICATIONS
        if let Ok(val) = std::env::var(format!("{}_NOTIFICATIONS", ENV_PREFIX)) {
            self.notifications_enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with GULLAK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gullak")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("gullak.db")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gullak")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "GULLAK_DATA_DIR",
        "GULLAK_ADVISOR_URL",
        "GULLAK_ADVISOR_TIMEOUT_SECS",
        "GULLAK_NOTIFICATIONS",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.advisor_url.is_none());
        assert_eq!(config.advisor_timeout_secs, 30);
        assert!(config.notifications_enabled);
        assert!(config.data_dir.ends_with("gullak"));
    }

    #[test]
    fn test_store_path() {
        let config = Config::default();
        assert!(config.store_path().ends_with("gullak.db"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("GULLAK_DATA_DIR", "/tmp/gullak-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/gullak-test"));
    }

    #[test]
    fn test_env_override_advisor_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.advisor_url.is_none());

        env::set_var("GULLAK_ADVISOR_URL", "http://localhost:8000/api/chat");
        config.apply_env_overrides();
        assert_eq!(
            config.advisor_url,
            Some("http://localhost:8000/api/chat".to_string())
        );

        // Empty string clears it
        env::set_var("GULLAK_ADVISOR_URL", "");
        config.apply_env_overrides();
        assert!(config.advisor_url.is_none());
    }

    #[test]
    fn test_env_override_notifications() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.notifications_enabled);

        env::set_var("GULLAK_NOTIFICATIONS", "false");
        config.apply_env_overrides();
        assert!(!config.notifications_enabled);

        env::set_var("GULLAK_NOTIFICATIONS", "1");
        config.apply_env_overrides();
        assert!(config.notifications_enabled);
    }

    #[test]
    fn test_env_override_timeout_ignores_garbage() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("GULLAK_ADVISOR_TIMEOUT_SECS", "not-a-number");
        config.apply_env_overrides();
        assert_eq!(config.advisor_timeout_secs, 30);

        env::set_var("GULLAK_ADVISOR_TIMEOUT_SECS", "5");
        config.apply_env_overrides();
        assert_eq!(config.advisor_timeout_secs, 5);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            advisor_url = "http://example.com/api/chat"
            advisor_timeout_secs = 10
            notifications_enabled = false
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(
            config.advisor_url,
            Some("http://example.com/api/chat".to_string())
        );
        assert_eq!(config.advisor_timeout_secs, 10);
        assert!(!config.notifications_enabled);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.advisor_url.is_none());
        assert_eq!(config.advisor_timeout_secs, 30);
    }
}
