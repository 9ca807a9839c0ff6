use thiserror::Error;

use crate::types::IsolationLevel;

/// Boxed error returned by an [`Executor`](crate::executor::Executor) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SqlDataApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Unsupported isolation level: {0}")]
    UnsupportedIsolationLevel(IsolationLevel),

    #[error("Remote call failed: {0}")]
    RemoteCall(#[source] BoxError),

    #[error("Protocol decode error: expected {expected}, got {actual}")]
    ProtocolDecode { expected: String, actual: String },

    #[error("Transaction state error: {0}")]
    TransactionState(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{primary} (compensating rollback also failed: {rollback})")]
    CompensationFailed {
        #[source]
        primary: Box<SqlDataApiError>,
        rollback: Box<SqlDataApiError>,
    },
}

impl SqlDataApiError {
    pub(crate) fn decode(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        SqlDataApiError::ProtocolDecode {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn tx_done() -> Self {
        SqlDataApiError::TransactionState(
            "transaction has already been committed or rolled back".to_string(),
        )
    }

    /// Only failures of the remote call itself are worth another attempt; everything else is
    /// deterministic and would fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, SqlDataApiError::RemoteCall(_))
    }

    /// The error that caused the operation to fail, looking through a failed compensation.
    #[must_use]
    pub fn primary(&self) -> &SqlDataApiError {
        match self {
            SqlDataApiError::CompensationFailed { primary, .. } => primary,
            other => other,
        }
    }
}
