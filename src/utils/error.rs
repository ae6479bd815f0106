use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("{endpoint} responded with status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("Input table has no '{column}' column")]
    MissingColumn { column: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::UnexpectedStatus { .. } => ErrorCategory::Network,
            EtlError::AuthError { .. } => ErrorCategory::Authentication,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingColumn { .. } => ErrorCategory::Data,
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單筆查詢失敗只會讓該列欄位為空
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Authentication | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::AuthError { .. } => {
                "Check DELL_CLIENT_ID / DELL_CLIENT_SECRET and that the identity endpoint is reachable"
            }
            EtlError::ApiError(_) | EtlError::UnexpectedStatus { .. } => {
                "Check network connectivity and the configured API endpoints"
            }
            EtlError::MissingColumn { .. } => {
                "Make sure the input header contains the identifier column (see --identifier-column)"
            }
            EtlError::CsvError(_) => "Make sure the input file is valid CSV/TSV with a header row",
            EtlError::IoError(_) => "Check that the input file exists and the output path is writable",
            EtlError::SerializationError(_) => "The vendor API returned an unexpected payload",
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::AuthError { .. } => {
                format!("Could not obtain an API token, nothing was written. ({})", self)
            }
            EtlError::MissingConfigError { field } => {
                format!("Required setting '{}' was not provided", field)
            }
            EtlError::IoError(e) => format!("File access failed: {}", e),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
