use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Invalid email format: {email}")]
    InvalidEmailFormat { email: String },

    #[error("{command} is not installed or not in the system PATH.")]
    ToolNotFound { command: String },

    #[error("An error occurred: {source}")]
    ExecutionError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Data cannot be exported as {format}: {reason}")]
    InvalidShape { format: String, reason: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CheckError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CheckError::InvalidEmailFormat { .. } | CheckError::ValidationError { .. } => {
                ErrorSeverity::Medium
            }
            CheckError::ToolNotFound { .. }
            | CheckError::ExecutionError { .. }
            | CheckError::ConfigError { .. } => ErrorSeverity::High,
            CheckError::UnsupportedFormat { .. }
            | CheckError::InvalidShape { .. }
            | CheckError::ZipError(_)
            | CheckError::CsvError(_)
            | CheckError::IoError(_)
            | CheckError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Message suitable for showing to the person who typed the address.
    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckError::InvalidEmailFormat { .. } => {
                "Invalid email format. Please enter a valid email address.".to_string()
            }
            CheckError::ToolNotFound { command } => format!(
                "{} is not installed or not found in the system PATH. Please ensure it is properly installed.",
                command
            ),
            CheckError::ExecutionError { source, .. } => format!("An error occurred: {}", source),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CheckError::InvalidEmailFormat { .. } => {
                "Use the form name@domain.tld with a top-level domain of at least two letters"
            }
            CheckError::ToolNotFound { .. } => {
                "Install holehe (pip install holehe) or pass its location with --command"
            }
            CheckError::ExecutionError { .. } => {
                "Check that the command is executable and runs on its own"
            }
            CheckError::ConfigError { .. } | CheckError::ValidationError { .. } => {
                "Review the command-line flags and the configuration file"
            }
            CheckError::IoError(_) | CheckError::ZipError(_) => {
                "Check that the output directory exists and is writable"
            }
            CheckError::UnsupportedFormat { .. }
            | CheckError::InvalidShape { .. }
            | CheckError::CsvError(_)
            | CheckError::SerializationError(_) => "This is a bug; please report it",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
