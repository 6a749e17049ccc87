use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

/// Broad grouping used for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
}

/// How bad an error is; the CLI turns this into an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PipelineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Data,
            Self::InvalidInput { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::IoError(e) => match e.kind() {
                std::io::ErrorKind::PermissionDenied => ErrorSeverity::Critical,
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::High,
            },
            Self::CsvError(_) | Self::SerializationError(_) => ErrorSeverity::High,
            Self::InvalidInput { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                "Check file permissions on the batch, work and production directories".to_string()
            }
            Self::IoError(_) => {
                "Check that the input paths exist and the disk is not full".to_string()
            }
            Self::CsvError(_) => {
                "Check the delimiter and header row of the dosage or annotation file".to_string()
            }
            Self::SerializationError(_) => "Re-run with --verbose to inspect the report".to_string(),
            Self::InvalidInput { .. } => "Correct the command-line arguments and retry".to_string(),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration file", field)
            }
            Self::MissingConfigError { field } => {
                format!("Add '{}' to the configuration file or pass it on the command line", field)
            }
            Self::ConfigValidationError { .. } => {
                "Make sure the configuration file is valid TOML".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("File system error: {}", e),
            Self::CsvError(e) => format!("Could not read tabular input: {}", e),
            Self::SerializationError(e) => format!("Could not serialize report: {}", e),
            Self::InvalidInput { message } => format!("Invalid input: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            Self::ConfigValidationError { message, .. } => {
                format!("Configuration could not be loaded: {}", message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_configuration_error() {
        let err = PipelineError::invalid_input("batch size must be positive");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("batch size must be positive"));
    }

    #[test]
    fn test_permission_denied_is_critical() {
        let err = PipelineError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("permissions"));
    }

    #[test]
    fn test_missing_config_suggestion_names_field() {
        let err = PipelineError::MissingConfigError {
            field: "deploy.target".to_string(),
        };
        assert!(err.recovery_suggestion().contains("deploy.target"));
        assert!(err.user_friendly_message().contains("deploy.target"));
    }
}
