use thiserror::Error;

/// Client-side rejection of an acquired file. Raised before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Bad file extension: {file_name} (allowed: {})", .allowed.join(", "))]
    BadExtension {
        file_name: String,
        allowed: Vec<String>,
    },
    #[error("File too large: {size} bytes exceeds {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Conflict: {message}")]
    Conflict { message: String },
    #[error("Transmission failed with status {status}")]
    Transmission { status: u16 },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Host error: {0}")]
    Host(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(error: reqwest::Error) -> Self {
        UploadError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(error: serde_json::Error) -> Self {
        UploadError::Config(error.to_string())
    }
}

impl UploadError {
    /// Whether the file never left the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Validation(_))
    }
}

pub type AppResult<T> = std::result::Result<T, UploadError>;
