// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "api.raygun.io";
pub const ENTRIES_PATH: &str = "/entries";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the reporting client. Read-only once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application API key, sent as `X-ApiKey`
    pub api_key: String,
    /// Collector host name
    pub host: String,
    /// Collector port, scheme default when unset
    pub port: Option<u16>,
    /// Use https for the collector URL
    pub use_ssl: bool,
    /// Keys whose values are masked in custom data and request fields
    pub filters: Vec<String>,
    /// Tags attached to every message
    pub tags: Vec<String>,
    /// Error class names that are never sent
    pub ignored_classes: Vec<String>,
    /// Skip the network entirely
    pub offline: bool,
    /// Machine name override, detected when unset
    pub machine_name: Option<String>,
    /// Include column numbers in stack frames
    pub report_column_numbers: bool,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Log level (e.g., trace, debug, info, warn, error), handed to
    /// [`crate::logger::init_logging`] by applications that let the client
    /// install its own subscriber
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: None,
            use_ssl: true,
            filters: Vec::new(),
            tags: Vec::new(),
            ignored_classes: Vec::new(),
            offline: false,
            machine_name: None,
            report_column_numbers: false,
            https_proxy: None,
            timeout: DEFAULT_TIMEOUT,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Convenience constructor with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("RAYGUN_APIKEY").unwrap_or_default();
        let host = env::var("RAYGUN_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("RAYGUN_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok());
        let use_ssl = env::var("RAYGUN_USE_SSL")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);
        let filters = env_list("RAYGUN_FILTERS");
        let tags = env_list("RAYGUN_TAGS");
        let ignored_classes = env_list("RAYGUN_IGNORED_CLASSES");
        let offline = env::var("RAYGUN_OFFLINE")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(false);
        let machine_name = env::var("RAYGUN_MACHINE_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty());
        let report_column_numbers = env::var("RAYGUN_REPORT_COLUMN_NUMBERS")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(false);
        let https_proxy = env::var("RAYGUN_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();
        let timeout = env::var("RAYGUN_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        let log_level = env::var("RAYGUN_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let config = Self {
            api_key,
            host,
            port,
            use_ssl,
            filters,
            tags,
            ignored_classes,
            offline,
            machine_name,
            report_column_numbers,
            https_proxy,
            timeout,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "API key cannot be empty".to_string(),
            ));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Collector host cannot be empty".to_string(),
            ));
        }

        if self.port == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Collector port must be greater than 0".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Collector URL messages are posted to
    #[must_use]
    pub fn entries_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        let host = self.host.trim().trim_end_matches('/');
        match self.port {
            Some(port) => format!("{scheme}://{host}:{port}{ENTRIES_PATH}"),
            None => format!("{scheme}://{host}{ENTRIES_PATH}"),
        }
    }

    /// Whether errors of this class are dropped before delivery
    #[must_use]
    pub fn is_ignored(&self, class_name: &str) -> bool {
        self.ignored_classes.iter().any(|ignored| ignored == class_name)
    }
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|val| {
            val.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: [&str; 13] = [
        "RAYGUN_APIKEY",
        "RAYGUN_HOST",
        "RAYGUN_PORT",
        "RAYGUN_USE_SSL",
        "RAYGUN_FILTERS",
        "RAYGUN_TAGS",
        "RAYGUN_IGNORED_CLASSES",
        "RAYGUN_OFFLINE",
        "RAYGUN_MACHINE_NAME",
        "RAYGUN_REPORT_COLUMN_NUMBERS",
        "RAYGUN_PROXY_HTTPS",
        "RAYGUN_TIMEOUT_SECS",
        "RAYGUN_LOG_LEVEL",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_requires_api_key() {
        assert!(ClientConfig::default().validate().is_err());
        assert!(ClientConfig::new("key").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        let config = ClientConfig::new("   ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_port_and_timeout() {
        let config = ClientConfig {
            port: Some(0),
            ..ClientConfig::new("key")
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..ClientConfig::new("key")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_host() {
        let config = ClientConfig {
            host: " ".to_string(),
            ..ClientConfig::new("key")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = ClientConfig {
            log_level: "verbose".to_string(),
            ..ClientConfig::new("key")
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log level 'verbose'"));
    }

    #[test]
    fn test_entries_url() {
        assert_eq!(
            ClientConfig::new("key").entries_url(),
            "https://api.raygun.io/entries"
        );

        let config = ClientConfig {
            host: "localhost".to_string(),
            port: Some(8080),
            use_ssl: false,
            ..ClientConfig::new("key")
        };
        assert_eq!(config.entries_url(), "http://localhost:8080/entries");
    }

    #[test]
    fn test_is_ignored_is_exact() {
        let config = ClientConfig {
            ignored_classes: vec!["TimeoutError".to_string()],
            ..ClientConfig::new("key")
        };
        assert!(config.is_ignored("TimeoutError"));
        assert!(!config.is_ignored("timeouterror"));
        assert!(!config.is_ignored("Error"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("RAYGUN_APIKEY", "env-key");
        env::set_var("RAYGUN_PORT", "9443");
        env::set_var("RAYGUN_FILTERS", "password, token,,");
        env::set_var("RAYGUN_TAGS", "web,eu-west");
        env::set_var("RAYGUN_OFFLINE", "TRUE");
        env::set_var("RAYGUN_TIMEOUT_SECS", "3");

        let config = ClientConfig::from_env();
        clear_env();

        let config = config.expect("config from env");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.port, Some(9443));
        assert_eq!(config.filters, vec!["password", "token"]);
        assert_eq!(config.tags, vec!["web", "eu-west"]);
        assert!(config.offline);
        assert!(config.use_ssl);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_from_env_without_key_fails() {
        clear_env();
        let config = ClientConfig::from_env();
        assert!(config.is_err());
    }
}
