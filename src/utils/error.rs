use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid quote format: {message}")]
    FormatError { message: String },

    #[error("Remote request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Failed to decode remote response: {message}")]
    DecodeError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Remote,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl QuoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::FormatError { .. } => ErrorCategory::Input,
            Self::TransportError(_) | Self::DecodeError { .. } => ErrorCategory::Remote,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Storage,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            // 遠端錯誤可重試
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("Please check your input: {}", message),
            Self::FormatError { message } => format!("Invalid JSON format: {}", message),
            Self::TransportError(e) if e.is_timeout() => {
                "The quote server did not answer in time".to_string()
            }
            Self::TransportError(_) => "Could not reach the quote server".to_string(),
            Self::DecodeError { .. } => "The quote server sent an unexpected response".to_string(),
            Self::IoError(e) => format!("Error reading or writing quote data: {}", e),
            Self::SerializationError(e) => format!("Stored quote data is corrupted: {}", e),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "Enter both a quote and a category",
            Self::FormatError { .. } => {
                "Provide a JSON array of objects with non-empty \"text\" and \"category\" fields"
            }
            Self::TransportError(_) => "Check the network connection and the --api-endpoint value",
            Self::DecodeError { .. } => "Make sure the endpoint returns a JSON array of records",
            Self::IoError(_) => "Check that the storage path exists and is writable",
            Self::SerializationError(_) => "Remove or repair the stored quotes file",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML config"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_high_severity() {
        let err = QuoteError::validation("quote text is empty");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("quote text is empty"));
    }

    #[test]
    fn test_decode_error_is_remote() {
        let err = QuoteError::decode("expected array");
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_format_error_from_import() {
        let err = QuoteError::format("expected a JSON array");
        assert!(err.user_friendly_message().contains("expected a JSON array"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
