//! Catalog source error types.

use thiserror::Error;

/// Errors raised while querying the relational system of record.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SourceError {
    /// Whether this is a connection-level failure rather than a data error.
    ///
    /// Connection-level failures are retried with backoff; decode and
    /// query-shape errors are not, because re-running the same statement
    /// reproduces them.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_level() {
        assert!(SourceError::Database(sqlx::Error::PoolTimedOut).is_connection());
        assert!(SourceError::Database(sqlx::Error::PoolClosed).is_connection());
        assert!(SourceError::Database(sqlx::Error::WorkerCrashed).is_connection());
    }

    #[test]
    fn test_data_errors_are_not_connection_level() {
        assert!(!SourceError::Database(sqlx::Error::RowNotFound).is_connection());
        assert!(!SourceError::Database(sqlx::Error::ColumnNotFound("title".into())).is_connection());
    }
}
