//! Error types for the PostgreSQL storage backend.

use bannerd_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique constraint violation (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for check constraint violation (23514).
pub const PG_CHECK_VIOLATION: &str = "23514";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Checks if a sqlx error is a unique constraint violation (23505).
pub fn is_unique_violation(err: &SqlxError) -> bool {
    has_pg_error_code(err, PG_UNIQUE_VIOLATION)
}

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Error reported by the driver or the server.
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(e) => classify(e),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Classifies a driver error once, at the storage boundary.
///
/// Constraint violations become domain errors and transport failures become
/// connection errors. Everything else, including rows the driver cannot
/// decode, is internal. Driver text never ends up in a domain error.
pub fn classify(err: SqlxError) -> StorageError {
    if is_unique_violation(&err) {
        let constraint = match &err {
            SqlxError::Database(db_err) => db_err.constraint().unwrap_or("unique").to_string(),
            _ => "unique".to_string(),
        };
        return StorageError::already_exists("banner tag", constraint);
    }
    if has_pg_error_code(&err, PG_CHECK_VIOLATION) {
        tracing::warn!(error = %err, "check constraint rejected banner data");
        return StorageError::invalid_data("banner data violates a store constraint");
    }
    match err {
        SqlxError::Io(_) | SqlxError::Tls(_) | SqlxError::PoolTimedOut | SqlxError::PoolClosed => {
            StorageError::connection_error(err.to_string())
        }
        other => StorageError::internal(other.to_string()),
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostgresError::config("invalid URL");
        assert!(err.to_string().contains("Configuration error"));

        let err = PostgresError::Migration("checksum mismatch".into());
        assert!(err.to_string().contains("Migration error"));
    }

    #[test]
    fn test_conversion_to_storage_error() {
        let storage_err: StorageError = PostgresError::config("test error").into();
        assert!(matches!(storage_err, StorageError::Internal { .. }));

        let storage_err: StorageError = PostgresError::Database(SqlxError::PoolTimedOut).into();
        assert!(matches!(storage_err, StorageError::ConnectionError { .. }));

        let storage_err = classify(SqlxError::RowNotFound);
        assert!(matches!(storage_err, StorageError::Internal { .. }));
    }

    #[test]
    fn test_decode_failures_are_internal() {
        let err = classify(SqlxError::Decode("unexpected null".into()));
        assert!(matches!(err, StorageError::Internal { .. }));

        let err = classify(SqlxError::ColumnDecode {
            index: "\"content\"".into(),
            source: "expected object".into(),
        });
        assert!(matches!(err, StorageError::Internal { .. }));
    }
}
