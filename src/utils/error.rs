use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Upload rejected: {}", .errors.join("; "))]
    UploadRejected { errors: Vec<String> },

    #[error("Upload workflow error: {0}")]
    StepperError(#[from] crate::core::stepper::StepperError),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Input validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Authentication,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ApiError { status, .. } if *status == 401 => {
                ErrorCategory::Authentication
            }
            ClientError::HttpError(_) | ClientError::ApiError { .. } => ErrorCategory::Network,
            ClientError::CsvError(_)
            | ClientError::SerializationError(_)
            | ClientError::UploadRejected { .. }
            | ClientError::StepperError(_)
            | ClientError::ValidationError { .. } => ErrorCategory::Data,
            ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ClientError::NotAuthenticated => ErrorCategory::Authentication,
            ClientError::IoError(_) | ClientError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::HttpError(_) => ErrorSeverity::Medium,
            ClientError::ApiError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            ClientError::ApiError { .. } => ErrorSeverity::High,
            ClientError::UploadRejected { .. }
            | ClientError::StepperError(_)
            | ClientError::ValidationError { .. }
            | ClientError::CsvError(_)
            | ClientError::SerializationError(_) => ErrorSeverity::High,
            ClientError::NotAuthenticated
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. } => ErrorSeverity::High,
            ClientError::IoError(_) | ClientError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::HttpError(_) => {
                "Could not reach the sentiment service".to_string()
            }
            ClientError::ApiError { message, .. } => message.clone(),
            ClientError::UploadRejected { errors } => {
                format!("Validation Errors:\n  - {}", errors.join("\n  - "))
            }
            ClientError::NotAuthenticated => "You need to sign in first".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check --api-url and that the backend is running, then retry",
            ErrorCategory::Data => {
                "Fix the CSV file (review_text, brand and product_id or product_name) and upload it again"
            }
            ErrorCategory::Configuration => "Review the command line flags or the TOML config file",
            ErrorCategory::Authentication => "Run `sentiment-client login <email> <password>`",
            ErrorCategory::System => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
