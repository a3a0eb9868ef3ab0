//! Configuration management for medserv
//!
//! This module handles loading, validation, and management of
//! dashboard configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Data source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the API snapshot files
    #[serde(default = "default_source_path")]
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from("./data")
}

/// Longest accepted service interval, one hundred years
pub const MAX_SERVICE_INTERVAL_DAYS: u32 = 36_500;

/// Overdue-service notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Days between two scheduled services of the same device
    #[serde(default = "default_service_interval_days")]
    pub service_interval_days: u32,
    /// Days before the due date at which a device is flagged as due soon
    #[serde(default = "default_warning_days")]
    pub warning_days: u32,
    /// Maximum number of alerts shown in the notification bell
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            service_interval_days: default_service_interval_days(),
            warning_days: default_warning_days(),
            max_alerts: default_max_alerts(),
        }
    }
}

fn default_service_interval_days() -> u32 {
    365
}

fn default_warning_days() -> u32 {
    30
}

fn default_max_alerts() -> usize {
    20
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for lists
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    25
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Number of most frequent error codes listed next to the chart
    #[serde(default = "default_top_codes")]
    pub top_codes: usize,
    /// Show chart legends
    #[serde(default = "default_true")]
    pub show_legend: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_codes: default_top_codes(),
            show_legend: true,
        }
    }
}

fn default_top_codes() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// Printable service report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Organization name printed in the report header
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Free text printed at the bottom of every report
    #[serde(default)]
    pub footer: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            footer: String::new(),
        }
    }
}

fn default_organization() -> String {
    "Field Service".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data source settings
    #[serde(default)]
    pub source: SourceConfig,
    /// Notification bell settings
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Print layout settings
    #[serde(default)]
    pub print: PrintConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        Self::from_yaml(&content)
    }

    /// Load configuration asynchronously
    pub async fn load_async(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.notifications.service_interval_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notifications.service_interval_days".to_string(),
                reason: "Service interval must be at least one day".to_string(),
            });
        }

        if self.notifications.service_interval_days > MAX_SERVICE_INTERVAL_DAYS {
            return Err(ConfigError::InvalidValue {
                field: "notifications.service_interval_days".to_string(),
                reason: format!("Service interval must be at most {} days", MAX_SERVICE_INTERVAL_DAYS),
            });
        }

        if self.notifications.warning_days >= self.notifications.service_interval_days {
            return Err(ConfigError::InvalidValue {
                field: "notifications.warning_days".to_string(),
                reason: "Warning window must be shorter than the service interval".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 || self.pagination.records_per_page > 500 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Records per page must be between 1 and 500".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorCode;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.source.path, PathBuf::from("./data"));
        assert_eq!(config.notifications.service_interval_days, 365);
        assert_eq!(config.notifications.warning_days, 30);
        assert_eq!(config.pagination.records_per_page, 25);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert_eq!(config.print.organization, "Field Service");
    }

    #[test]
    fn test_partial_section() {
        let config = Config::from_yaml("notifications:\n  warning_days: 14\n").unwrap();
        assert_eq!(config.notifications.warning_days, 14);
        assert_eq!(config.notifications.service_interval_days, 365);
        assert_eq!(config.notifications.max_alerts, 20);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidValue);
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_warning_window_longer_than_interval() {
        let yaml = "notifications:\n  service_interval_days: 30\n  warning_days: 30\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("notifications.warning_days"));
    }

    #[test]
    fn test_records_per_page_bounds() {
        assert!(Config::from_yaml("pagination:\n  records_per_page: 0\n").is_err());
        assert!(Config::from_yaml("pagination:\n  records_per_page: 501\n").is_err());
        assert!(Config::from_yaml("pagination:\n  records_per_page: 500\n").is_ok());
    }

    #[test]
    fn test_service_interval_upper_bound() {
        let err = Config::from_yaml("notifications:\n  service_interval_days: 4000000000\n").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidValue);
        assert!(err.to_string().contains("notifications.service_interval_days"));

        assert!(Config::from_yaml("notifications:\n  service_interval_days: 36500\n").is_ok());
        assert!(Config::from_yaml("notifications:\n  service_interval_days: 36501\n").is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidYaml);
    }

    #[test]
    fn test_invalid_yaml_keeps_parser_message() {
        let err = Config::from_yaml("server:\n  port: eighty\n").unwrap_err();
        let ConfigError::InvalidYaml { message } = &err else {
            panic!("expected InvalidYaml, got {:?}", err);
        };
        assert!(message.contains("line 2"), "{}", message);
        assert!(err.to_details().to_string().contains("line 2"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/medserv/config.yaml").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::FileNotFound);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9090\nsource:\n  path: /srv/snapshots").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.source.path, PathBuf::from("/srv/snapshots"));
    }
}
