use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Report snapshot failed: {message}")]
    SnapshotError { message: String },

    #[error("Report delivery rejected with status {status}: {body}")]
    DeliveryRejected { status: u16, body: String },

    #[error("Report delivery was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Storage,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EstimatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EstimatorError::ConfigError { .. }
            | EstimatorError::ConfigValidationError { .. }
            | EstimatorError::InvalidConfigValueError { .. }
            | EstimatorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EstimatorError::ValidationError { .. } => ErrorCategory::Input,
            EstimatorError::ApiError(_)
            | EstimatorError::DeliveryRejected { .. }
            | EstimatorError::Cancelled => ErrorCategory::Network,
            EstimatorError::IoError(_) | EstimatorError::ZipError(_) => ErrorCategory::Storage,
            EstimatorError::CsvError(_)
            | EstimatorError::SerializationError(_)
            | EstimatorError::SnapshotError { .. } => ErrorCategory::Rendering,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EstimatorError::Cancelled => ErrorSeverity::Low,
            // 使用者可手動重試
            EstimatorError::ApiError(_)
            | EstimatorError::DeliveryRejected { .. }
            | EstimatorError::SnapshotError { .. }
            | EstimatorError::ValidationError { .. } => ErrorSeverity::Medium,
            EstimatorError::ConfigError { .. }
            | EstimatorError::ConfigValidationError { .. }
            | EstimatorError::InvalidConfigValueError { .. }
            | EstimatorError::MissingConfigError { .. }
            | EstimatorError::CsvError(_)
            | EstimatorError::SerializationError(_) => ErrorSeverity::High,
            EstimatorError::IoError(_) | EstimatorError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    /// 命令列結束代碼；取消依 SIGINT 慣例回傳 130
    pub fn exit_code(&self) -> i32 {
        match self {
            EstimatorError::Cancelled => 130,
            other => match other.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EstimatorError::ApiError(_) => {
                "Check your network connection and the delivery endpoint, then send again"
            }
            EstimatorError::DeliveryRejected { .. } => {
                "The report service refused the request; retry later or export the report locally with --export"
            }
            EstimatorError::SnapshotError { .. } => {
                "Make sure the report snapshot file exists and is readable, then retry"
            }
            EstimatorError::ValidationError { .. } => {
                "Correct the highlighted field and continue"
            }
            EstimatorError::Cancelled => "Send the report again when ready",
            EstimatorError::ConfigError { .. }
            | EstimatorError::ConfigValidationError { .. }
            | EstimatorError::InvalidConfigValueError { .. }
            | EstimatorError::MissingConfigError { .. } => {
                "Review the configuration file and command-line flags"
            }
            EstimatorError::CsvError(_) | EstimatorError::SerializationError(_) => {
                "Check the input answers file for malformed values"
            }
            EstimatorError::IoError(_) | EstimatorError::ZipError(_) => {
                "Check that the output path exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EstimatorError::ValidationError { field, message } => {
                format!("Please check '{}': {}", field, message)
            }
            EstimatorError::SnapshotError { .. } => {
                "Error generating the report. Please try again.".to_string()
            }
            EstimatorError::ApiError(_) | EstimatorError::DeliveryRejected { .. } => {
                "Failed to send the report by email. You can download it instead.".to_string()
            }
            EstimatorError::Cancelled => "Report sending was cancelled.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
