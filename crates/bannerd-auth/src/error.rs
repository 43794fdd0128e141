//! Authentication and authorization error types.

/// Errors that can occur while authenticating a request or signing in.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request lacks valid authentication credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The caller is authenticated but may not perform the action.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The bearer token is malformed, expired, or badly signed.
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Sign-in for a name the store does not know.
    #[error("Unknown user: {name}")]
    UnknownUser { name: String },

    /// Store or signing failure.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_user(name: impl Into<String>) -> Self {
        Self::UnknownUser { name: name.into() }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` for errors that answer 401.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::InvalidToken { .. } | Self::UnknownUser { .. }
        )
    }
}

impl From<bannerd_storage::StorageError> for AuthError {
    fn from(err: bannerd_storage::StorageError) -> Self {
        Self::internal(err.to_string())
    }
}
