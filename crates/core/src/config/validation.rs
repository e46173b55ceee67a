//! Configuration validation rules.
//!
//! This module provides validation logic for `SplashConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::SplashConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl SplashConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `host` is empty or carries a scheme
    /// - `timeout` is 0 or exceeds one hour
    /// - `resource_timeout` exceeds `timeout`
    /// - `wait` is negative or not below `timeout`
    /// - `http_timeout_ms` is below 100ms, or `fetch_deadline_ms` below it
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "host".into(), reason: "must not be empty".into() });
        }
        if self.host.contains("://") {
            return Err(ConfigError::Invalid { field: "host".into(), reason: "must be host:port without scheme".into() });
        }

        if self.timeout == 0 {
            return Err(ConfigError::Invalid { field: "timeout".into(), reason: "must be greater than 0".into() });
        }
        if self.timeout > 3600 {
            return Err(ConfigError::Invalid { field: "timeout".into(), reason: "must not exceed 3600 seconds".into() });
        }

        if self.resource_timeout > self.timeout {
            return Err(ConfigError::Invalid {
                field: "resource_timeout".into(),
                reason: "must not exceed timeout".into(),
            });
        }

        if !self.wait.is_finite() || self.wait < 0.0 {
            return Err(ConfigError::Invalid { field: "wait".into(), reason: "must be a non-negative number".into() });
        }
        if self.wait >= f64::from(self.timeout) {
            return Err(ConfigError::Invalid { field: "wait".into(), reason: "must be less than timeout".into() });
        }

        if self.http_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "http_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.fetch_deadline_ms < self.http_timeout_ms {
            return Err(ConfigError::Invalid {
                field: "fetch_deadline_ms".into(),
                reason: "must be at least http_timeout_ms".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.http_timeout_ms < u64::from(self.timeout) * 1000 {
            tracing::warn!(
                http_timeout_ms = self.http_timeout_ms,
                splash_timeout_s = self.timeout,
                "local HTTP timeout is shorter than the Splash render timeout; \
                 slow renders will be cut off locally"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = SplashConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let config = SplashConfig { host: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "host"));
    }

    #[test]
    fn test_validate_host_with_scheme() {
        let config = SplashConfig { host: "http://localhost:8050".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "host"));
    }

    #[test]
    fn test_validate_timeout_zero() {
        let config = SplashConfig { timeout: 0, resource_timeout: 0, wait: 0.0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout"));
    }

    #[test]
    fn test_validate_resource_timeout_exceeds_timeout() {
        let config = SplashConfig { timeout: 10, resource_timeout: 11, wait: 0.5, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "resource_timeout"));
    }

    #[test]
    fn test_validate_wait_not_below_timeout() {
        let config = SplashConfig { timeout: 5, resource_timeout: 5, wait: 5.0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "wait"));
    }

    #[test]
    fn test_validate_negative_wait() {
        let config = SplashConfig { wait: -0.1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "wait"));
    }

    #[test]
    fn test_validate_http_timeout_too_small() {
        let config = SplashConfig { http_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "http_timeout_ms"));
    }

    #[test]
    fn test_validate_deadline_below_http_timeout() {
        let config = SplashConfig { http_timeout_ms: 10_000, fetch_deadline_ms: 9_999, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "fetch_deadline_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = SplashConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = SplashConfig {
            timeout: 1,
            resource_timeout: 1,
            wait: 0.0,
            http_timeout_ms: 100,
            fetch_deadline_ms: 100,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
