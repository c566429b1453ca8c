use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Browser operation failed: {0}")]
    BrowserError(#[from] chromiumoxide::error::CdpError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Map application unavailable: {message}")]
    SurfaceUnavailable { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Browser,
    Network,
    Storage,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HarvestError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BrowserError(_) | Self::SurfaceUnavailable { .. } | Self::Timeout { .. } => {
                ErrorCategory::Browser
            }
            Self::ApiError(_) => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Timeout { .. } => ErrorSeverity::Low,
            Self::ApiError(_) => ErrorSeverity::Medium,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorSeverity::High
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::BrowserError(_) | Self::SurfaceUnavailable { .. } | Self::IoError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Browser => {
                "Check that Chrome/Chromium is installed and the map application is reachable"
            }
            ErrorCategory::Network => "Check the network connection and the region list URL",
            ErrorCategory::Storage => "Check that the data directory exists and is writable",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Data => {
                "The stored JSON or the region table may be malformed; inspect or restore it"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SurfaceUnavailable { message } => {
                format!("The map application could not be reached: {}", message)
            }
            Self::ApiError(_) => "Failed to download the region list".to_string(),
            Self::SerializationError(_) => "Failed to read or write the JSON data files".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_surface_error_is_critical() {
        let err = HarvestError::SurfaceUnavailable {
            message: "search box missing".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Browser);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("search box missing"));
    }

    #[test]
    fn test_config_errors_share_category() {
        let err = HarvestError::InvalidConfigValueError {
            field: "gallery.max_photos".to_string(),
            value: "9".to_string(),
            reason: "Value must be between 1 and 5".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.to_string(),
            "Invalid value '9' for 'gallery.max_photos': Value must be between 1 and 5"
        );
    }
}
