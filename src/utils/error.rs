use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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

    #[error("Failed to load input '{path}': {message}")]
    InputError { path: String, message: String },

    #[error("Input has no '{column}' column (found: {available})")]
    MissingColumnError { column: String, available: String },

    #[error("Completion request rejected with status {status}: {message}")]
    CompletionError { status: u16, message: String },

    #[error("Completion response contained no choices")]
    EmptyCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Completion,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::WorkbookError(_)
            | EtlError::InputError { .. }
            | EtlError::MissingColumnError { .. } => ErrorCategory::Input,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CompletionError { .. } | EtlError::EmptyCompletion => {
                ErrorCategory::Completion
            }
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Completion => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingConfigError { .. } => {
                "Set the missing value on the command line, in the job file, or via OPENAI_API_KEY"
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Check the configuration values and try again"
            }
            EtlError::MissingColumnError { .. } => {
                "Pass --name-column with the header that holds the product names"
            }
            EtlError::CsvError(_) | EtlError::WorkbookError(_) | EtlError::InputError { .. } => {
                "Make sure the input file exists and is an Excel workbook or CSV file with a header row"
            }
            EtlError::ApiError(_) => "Check network connectivity and the API base URL",
            EtlError::CompletionError { status, .. } if *status == 401 => {
                "Check that the API key is valid"
            }
            EtlError::CompletionError { .. } | EtlError::EmptyCompletion => {
                "Check the model name and token budget, then retry"
            }
            EtlError::IoError(_) | EtlError::SerializationError(_) => {
                "Check that the output directory is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the product list: {}", self),
            ErrorCategory::Network => format!("Could not reach the completion API: {}", self),
            ErrorCategory::Completion => format!("The completion API failed: {}", self),
            ErrorCategory::Output => format!("Could not write the results: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
