//! Startup errors for medserv-config

use std::fmt;
use thiserror::Error;

/// Stable code printed in front of a startup failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    InvalidValue,
    IoError,
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::InvalidYaml => "INVALID_YAML",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
            ConfigErrorCode::IoError => "IO_ERROR",
        };
        f.write_str(code)
    }
}

/// What the binary prints before exiting on a bad config file
#[derive(Debug, Clone)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    pub hints: Vec<String>,
}

impl fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        for hint in &self.hints {
            write!(f, "\n  - {}", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config file is not valid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot read config file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::IoError { .. } => ConfigErrorCode::IoError,
        }
    }

    /// Message plus hints pointing at `--config` and `--init`
    pub fn to_details(&self) -> ConfigErrorDetails {
        let hints = match self {
            ConfigError::FileNotFound { .. } => vec![
                "Use --config to point at an existing file.".to_string(),
                "Run with --init to write the default configuration.".to_string(),
            ],
            ConfigError::InvalidYaml { .. } => {
                vec!["Compare your file with the output of --init.".to_string()]
            }
            ConfigError::InvalidValue { .. } | ConfigError::IoError { .. } => Vec::new(),
        };

        ConfigErrorDetails {
            code: self.code(),
            message: self.to_string(),
            hints,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_render_code_and_message() {
        let error = ConfigError::InvalidValue {
            field: "server.port".to_string(),
            reason: "Port must be greater than 0".to_string(),
        };
        let printed = error.to_details().to_string();

        assert_eq!(printed, "[INVALID_VALUE] Invalid value for server.port: Port must be greater than 0");
    }

    #[test]
    fn test_missing_file_hints_at_init() {
        let details = ConfigError::FileNotFound { path: "config.yaml".to_string() }.to_details();
        assert_eq!(details.code, ConfigErrorCode::FileNotFound);
        assert!(details.hints.iter().any(|s| s.contains("--init")));
        assert!(details.to_string().contains("\n  - Use --config"));
    }
}
