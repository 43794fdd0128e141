use thiserror::Error;

/// Core error types for banner validation and key parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid banner: {message}")]
    InvalidBanner { message: String },

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

impl CoreError {
    /// Create a new InvalidBanner error
    pub fn invalid_banner(message: impl Into<String>) -> Self {
        Self::InvalidBanner {
            message: message.into(),
        }
    }

    /// Create a new InvalidKey error
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
