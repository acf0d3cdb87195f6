use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Failed to parse config file '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl CoverageError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CoverageError::ConfigError { .. }
                | CoverageError::ConfigParseError { .. }
                | CoverageError::InvalidConfigValueError { .. }
        )
    }

    /// Exit code for the CLI. `1` is reserved for a failed coverage check.
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            3
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CoverageError::IoError(e) => format!("Could not access a file or directory: {}", e),
            CoverageError::WalkError(e) => format!("Could not walk directory tree: {}", e),
            CoverageError::SerializationError(e) => format!("Could not render report: {}", e),
            CoverageError::TaskError(e) => format!("Internal task failure: {}", e),
            CoverageError::ConfigError { message } => format!("Configuration problem: {}", message),
            CoverageError::ConfigParseError { path, message } => {
                format!("Config file '{}' is not valid TOML: {}", path, message)
            }
            CoverageError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Setting '{}' = '{}' is invalid: {}", field, value, reason),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CoverageError::IoError(_) | CoverageError::WalkError(_) => {
                "Check that the rules and tests directories are readable"
            }
            CoverageError::SerializationError(_) => "Try again with --format text",
            CoverageError::TaskError(_) => "Re-run the check; lower --max-concurrent-reads if it persists",
            CoverageError::ConfigError { .. } | CoverageError::ConfigParseError { .. } => {
                "Fix the config file or pass the setting on the command line"
            }
            CoverageError::InvalidConfigValueError { .. } => "Correct the value and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoverageError>;
