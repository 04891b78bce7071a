use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertError {
    #[error("CSV must contain columns for student name, course name, and date")]
    SchemaError,

    #[error("{message}")]
    FileTypeError { message: String },

    #[error("CSV data missing")]
    EmptyRosterError,

    #[error("Background image not uploaded")]
    MissingAssetError,

    #[error("Failed to generate certificate for {student}")]
    GenerationRequestError { student: String },

    #[error("A generation run is already in progress")]
    RunInProgressError,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Precondition,
    Network,
    Configuration,
    System,
}

impl CertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CertError::SchemaError | CertError::FileTypeError { .. } | CertError::CsvError(_) => {
                ErrorCategory::Input
            }
            CertError::EmptyRosterError
            | CertError::MissingAssetError
            | CertError::RunInProgressError => ErrorCategory::Precondition,
            CertError::GenerationRequestError { .. } | CertError::ApiError(_) => {
                ErrorCategory::Network
            }
            CertError::ConfigError { .. } | CertError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            CertError::ZipError(_) | CertError::IoError(_) | CertError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Precondition => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CertError::SchemaError => {
                "Rename the CSV headers so one column each mentions name/student, course/subject and date/completion"
            }
            CertError::FileTypeError { .. } => "Check the file you passed for this slot",
            CertError::EmptyRosterError => "Upload a CSV with at least one complete data row",
            CertError::MissingAssetError => "Provide a background image before generating",
            CertError::GenerationRequestError { .. } | CertError::ApiError(_) => {
                "Verify the rendering backend is reachable and retry the run"
            }
            CertError::RunInProgressError => "Wait for the current run to finish",
            CertError::ConfigError { .. } | CertError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and restart"
            }
            CertError::CsvError(_) => "Check the roster file for malformed rows",
            CertError::ZipError(_) | CertError::IoError(_) | CertError::SerializationError(_) => {
                "Check disk space and permissions on the output directory"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            // 網路層錯誤對使用者顯示統一訊息
            CertError::ApiError(_) => "Error generating certificates".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertError>;
