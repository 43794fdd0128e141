use bannerd_core::CoreError;
use bannerd_storage::{ErrorCategory, StorageError};

use crate::cache::CacheError;

/// Outcome classes the request layer maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Invalid,
    Conflict,
    Internal,
}

/// Errors returned by [`BannerService`](super::BannerService).
///
/// `Internal` keeps its cause for logging; it is never shown to callers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("banner not found")]
    NotFound,

    #[error("banner is not available to this user")]
    Forbidden,

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, category = %err.category(), "storage failure");
            return Self::Internal(err.to_string());
        }
        match err.category() {
            ErrorCategory::NotFound => Self::NotFound,
            ErrorCategory::Conflict => Self::Conflict(
                "a banner already exists for one of these feature/tag pairs".into(),
            ),
            ErrorCategory::Validation => {
                tracing::warn!(error = %err, "store rejected banner data");
                Self::Invalid("banner data was rejected by the store".into())
            }
            ErrorCategory::Transaction
            | ErrorCategory::Infrastructure
            | ErrorCategory::Internal => Self::Internal(err.to_string()),
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        if err.is_miss() {
            return Self::NotFound;
        }
        tracing::error!(error = %err, "read cache failure");
        Self::Internal(err.to_string())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        Self::Invalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bannerd_core::BannerKey;

    #[test]
    fn storage_errors_are_classified_once() {
        let cases = [
            (StorageError::not_found("banner", 1), ErrorKind::NotFound),
            (StorageError::already_exists("banner tag", "x"), ErrorKind::Conflict),
            (StorageError::invalid_data("bad"), ErrorKind::Invalid),
            (StorageError::connection_error("refused"), ErrorKind::Internal),
            (StorageError::transaction_error("commit"), ErrorKind::Internal),
            (StorageError::internal("boom"), ErrorKind::Internal),
        ];
        for (err, kind) in cases {
            assert_eq!(ServiceError::from(err).kind(), kind);
        }
    }

    #[test]
    fn cache_miss_is_not_found() {
        let err: ServiceError = CacheError::miss(BannerKey::new(1, 2)).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: ServiceError = CacheError::transport("down").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
