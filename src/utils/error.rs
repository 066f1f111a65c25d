use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Storage operation failed: {0}")]
    StorageError(#[from] sled::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Storage,
    Network,
    Data,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::ConfigError { .. }
            | TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TrackerError::StorageError(_) | TrackerError::StorageUnavailable { .. } => {
                ErrorCategory::Storage
            }
            TrackerError::HttpError(_) => ErrorCategory::Network,
            TrackerError::SerializationError(_) | TrackerError::ValidationError { .. } => {
                ErrorCategory::Data
            }
            TrackerError::IoError(_) => ErrorCategory::Runtime,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::ValidationError { .. } => ErrorSeverity::Low,
            TrackerError::HttpError(_) => ErrorSeverity::Medium,
            TrackerError::ConfigError { .. }
            | TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::SerializationError(_) => ErrorSeverity::High,
            TrackerError::StorageError(_)
            | TrackerError::StorageUnavailable { .. }
            | TrackerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::ConfigError { message } => format!("Configuration problem: {}", message),
            TrackerError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            TrackerError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            TrackerError::StorageError(_) | TrackerError::StorageUnavailable { .. } => {
                "The reading database could not be opened or written".to_string()
            }
            TrackerError::HttpError(e) => format!("Could not reach the server: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML file, environment variables and command line flags"
            }
            ErrorCategory::Storage => {
                "Check that the storage path exists, is writable and not locked by another process"
            }
            ErrorCategory::Network => "Check that the server is running and the URL is correct",
            ErrorCategory::Data => "Check the payload format",
            ErrorCategory::Runtime => "Retry the operation; if it persists, inspect the logs",
        }
    }

    /// 依嚴重程度決定程序的結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 結束碼；錯誤鏈中沒有 `TrackerError` 時，IO 失敗視為 critical
    pub fn exit_code_for(err: &anyhow::Error) -> i32 {
        for cause in err.chain() {
            if let Some(tracker) = cause.downcast_ref::<TrackerError>() {
                return tracker.exit_code();
            }
            if cause.downcast_ref::<std::io::Error>().is_some() {
                return 3;
            }
        }
        1
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = TrackerError::InvalidConfigValueError {
            field: "server.port".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 1 and 65535".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_storage_errors_are_critical() {
        let err = TrackerError::StorageUnavailable {
            message: "locked".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.exit_code(), 3);
        assert!(err.recovery_suggestion().contains("storage path"));
    }

    #[test]
    fn test_every_error_exits_with_failure() {
        let err = TrackerError::ValidationError {
            message: "sensor_id cannot be empty".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_exit_code_for_wrapped_errors() {
        let bind_failure = anyhow::Error::new(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ))
        .context("Failed to bind 0.0.0.0:5000");
        assert_eq!(TrackerError::exit_code_for(&bind_failure), 3);

        let config_failure = anyhow::Error::new(TrackerError::ConfigError {
            message: "bad".to_string(),
        });
        assert_eq!(TrackerError::exit_code_for(&config_failure), 1);

        assert_eq!(TrackerError::exit_code_for(&anyhow::anyhow!("Server error")), 1);
    }
}
