//! Splash connection configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SPLASH_*)
//! 2. Legacy `SPLASH` variable holding the host
//! 3. TOML config file (if SPLASHKIT_CONFIG_FILE set)
//! 4. Built-in defaults
//!
//! The loaded value is immutable; the fetcher receives it once at construction
//! and never consults the environment again.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_FILE_ENV: &str = "SPLASHKIT_CONFIG_FILE";

/// Splash connection parameters.
///
/// `timeout`, `resource_timeout` and `wait` are forwarded to Splash and enforced
/// there. `http_timeout_ms` and `fetch_deadline_ms` are enforced locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplashConfig {
    /// Splash host address as `host:port`, without scheme.
    ///
    /// Set via SPLASH_HOST (or the legacy SPLASH) environment variable.
    #[serde(default = "default_host")]
    pub host: String,

    /// Overall render timeout in seconds, passed to Splash.
    ///
    /// Set via SPLASH_TIMEOUT environment variable.
    #[serde(default = "default_timeout")]
    pub timeout: u32,

    /// Per-resource load timeout in seconds, passed to Splash.
    ///
    /// Set via SPLASH_RESOURCE_TIMEOUT environment variable.
    #[serde(default = "default_resource_timeout")]
    pub resource_timeout: u32,

    /// Seconds Splash waits after page load before it considers rendering done.
    ///
    /// Set via SPLASH_WAIT environment variable.
    #[serde(default = "default_wait")]
    pub wait: f64,

    /// Local timeout for a single HTTP call to Splash, in milliseconds.
    ///
    /// Set via SPLASH_HTTP_TIMEOUT_MS environment variable.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Local deadline for a whole fetch including the reset-and-retry cycle.
    ///
    /// Set via SPLASH_FETCH_DEADLINE_MS environment variable.
    #[serde(default = "default_fetch_deadline_ms")]
    pub fetch_deadline_ms: u64,

    /// User-Agent for requests to Splash itself.
    ///
    /// Set via SPLASH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_host() -> String {
    "127.0.0.1:8050".into()
}

fn default_timeout() -> u32 {
    30
}

fn default_resource_timeout() -> u32 {
    20
}

fn default_wait() -> f64 {
    0.5
}

fn default_http_timeout_ms() -> u64 {
    45_000
}

fn default_fetch_deadline_ms() -> u64 {
    100_000
}

fn default_user_agent() -> String {
    "splashkit/0.1".into()
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout: default_timeout(),
            resource_timeout: default_resource_timeout(),
            wait: default_wait(),
            http_timeout_ms: default_http_timeout_ms(),
            fetch_deadline_ms: default_fetch_deadline_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl SplashConfig {
    /// Per-call HTTP timeout as Duration for use with reqwest.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Whole-fetch deadline as Duration for use with tokio.
    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_millis(self.fetch_deadline_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SPLASH_`
    /// 2. `SPLASH` (host only)
    /// 3. TOML file from `SPLASHKIT_CONFIG_FILE` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
        Self::load_from(config_file)
    }

    /// Same as [`SplashConfig::load`] with an explicit config file path.
    pub fn load_from(config_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(Env::raw().only(&["SPLASH"]).map(|_| "host".into()))
            .merge(
                Env::prefixed("SPLASH_")
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SplashConfig::default();
        assert_eq!(config.host, "127.0.0.1:8050");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.resource_timeout, 20);
        assert_eq!(config.wait, 0.5);
        assert_eq!(config.http_timeout_ms, 45_000);
        assert_eq!(config.fetch_deadline_ms, 100_000);
        assert_eq!(config.user_agent, "splashkit/0.1");
    }

    #[test]
    fn test_durations() {
        let config = SplashConfig::default();
        assert_eq!(config.http_timeout(), Duration::from_millis(45_000));
        assert_eq!(config.fetch_deadline(), Duration::from_millis(100_000));
    }

    #[test]
    fn test_config_serialized_field_names() {
        let config = SplashConfig { host: "splash:8050".into(), wait: 2.0, ..Default::default() };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["host"], "splash:8050");
        assert_eq!(value["resource_timeout"], 20);
    }

    const CONFIG_TOML: &str = r#"
        host = "file-host:8050"
        timeout = 60
        user_agent = "from-file"
    "#;

    #[test]
    fn test_load_file_then_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("splashkit.toml", CONFIG_TOML)?;
            jail.set_env("SPLASH_TIMEOUT", "90");

            let config = SplashConfig::load_from(Some(PathBuf::from("splashkit.toml"))).unwrap();
            assert_eq!(config.host, "file-host:8050");
            assert_eq!(config.user_agent, "from-file");
            assert_eq!(config.timeout, 90);
            assert_eq!(config.resource_timeout, 20);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_file_env_var() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("splashkit.toml", CONFIG_TOML)?;
            jail.set_env(CONFIG_FILE_ENV, "splashkit.toml");

            let config = SplashConfig::load().unwrap();
            assert_eq!(config.host, "file-host:8050");
            assert_eq!(config.timeout, 60);
            Ok(())
        });
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = SplashConfig::load_from(Some(PathBuf::from("absent.toml"))).unwrap();
            assert_eq!(config, SplashConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_legacy_splash_host() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("splashkit.toml", CONFIG_TOML)?;
            jail.set_env("SPLASH", "legacy:1");

            let config = SplashConfig::load_from(Some(PathBuf::from("splashkit.toml"))).unwrap();
            assert_eq!(config.host, "legacy:1");

            jail.set_env("SPLASH_HOST", "new:2");
            let config = SplashConfig::load_from(Some(PathBuf::from("splashkit.toml"))).unwrap();
            assert_eq!(config.host, "new:2");
            Ok(())
        });
    }

    #[test]
    fn test_load_unparseable_env_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SPLASH_TIMEOUT", "soon");

            let result = SplashConfig::load_from(None);
            assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
            Ok(())
        });
    }

    #[test]
    fn test_load_validates_after_merge() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SPLASH_RESOURCE_TIMEOUT", "45");

            let result = SplashConfig::load_from(None);
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "resource_timeout"));

            jail.set_env("SPLASH_HOST", "http://splash:8050");
            jail.set_env("SPLASH_RESOURCE_TIMEOUT", "10");
            let result = SplashConfig::load_from(None);
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "host"));
            Ok(())
        });
    }
}
