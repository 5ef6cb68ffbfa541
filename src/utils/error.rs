use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Module '{module}' configuration failed: {message}")]
    ModuleConfigError { module: String, message: String },

    #[error("Cannot parse field '{input}': {reason}")]
    FieldParseError { input: String, reason: String },
}

impl DispatchError {
    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DispatchError::IoError(_) => "Check that the file exists and is readable",
            DispatchError::ConfigValidationError { .. } | DispatchError::InvalidConfigValueError { .. } => {
                "Review the dispatch TOML configuration file"
            }
            DispatchError::ModuleConfigError { .. } => {
                "Fix the module's cfg.toml; the module still runs without it"
            }
            DispatchError::FieldParseError { .. } => "Pass fields as key=value",
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
