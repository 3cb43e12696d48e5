//! Error types for TrendLens

use thiserror::Error;

/// Result type alias using TrendLens's Error
pub type Result<T> = std::result::Result<T, Error>;

/// TrendLens error types
///
/// Validation errors are rejected before dispatch and surfaced directly to
/// the caller. Source and timeout errors are recovered inside the dispatcher
/// and never escape it. History write failures are logged and swallowed.
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (rejected pre-dispatch)
    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("Result limit {0} is out of bounds (must be between 1 and {1})")]
    InvalidLimit(u32, u32),

    #[error("Unknown search scope '{0}'")]
    InvalidScope(String),

    #[error("Caller is not authenticated")]
    Unauthorized,

    // Per-source errors (recovered inside dispatch)
    #[error("Source '{entity}' failed: {message}")]
    Source { entity: String, message: String },

    #[error("Source '{0}' timed out after {1}ms")]
    Timeout(String, u64),

    // History recording (best-effort, never propagated to the caller)
    #[error("Failed to record search history: {0}")]
    HistoryWrite(String),

    // Fatal errors (fail the whole request)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable wire code for this error, used by the API error envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "EMPTY_QUERY",
            Self::InvalidLimit(..) => "INVALID_LIMIT",
            Self::InvalidScope(_) => "INVALID_SCOPE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Source { .. } => "SOURCE_ERROR",
            Self::Timeout(..) => "SOURCE_TIMEOUT",
            Self::HistoryWrite(_) => "HISTORY_WRITE",
            Self::Database(_) | Self::Internal(_) | Self::Config(_) | Self::Io(_) => "INTERNAL",
        }
    }

    /// Whether this error is a pre-dispatch validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuery | Self::InvalidLimit(..) | Self::InvalidScope(_) | Self::Unauthorized
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::EmptyQuery.code(), "EMPTY_QUERY");
        assert_eq!(Error::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(Error::InvalidScope("bogus".into()).code(), "INVALID_SCOPE");
        assert_eq!(Error::Internal("scorer produced NaN".into()).code(), "INTERNAL");
        assert_eq!(Error::InvalidLimit(500, 200).code(), "INVALID_LIMIT");
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::EmptyQuery.is_validation());
        assert!(Error::InvalidLimit(0, 200).is_validation());
        assert!(!Error::Internal("x".into()).is_validation());
        assert!(
            !Error::Source {
                entity: "tag".into(),
                message: "boom".into()
            }
            .is_validation()
        );
    }
}
