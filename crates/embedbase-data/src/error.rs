//! Error types for vector database integrations.

/// Boxed error used as the source of backend failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for all storage operations.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type surfaced by [`VectorDatabase`] implementations.
///
/// [`VectorDatabase`]: crate::VectorDatabase
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller supplied arguments the operation cannot act on.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An embedding does not match the configured dimensionality.
    #[error("Invalid vector dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The requested resource does not exist in the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected or failed the request.
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a backend error without an underlying source
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Create a backend error wrapping the underlying failure
    pub fn backend_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns whether this error reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_backend_error_keeps_source() {
        let io = std::io::Error::other("socket closed");
        let err = Error::backend_with_source("upsert failed", io);

        assert_eq!(err.to_string(), "Backend error: upsert failed");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("socket closed"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::not_found("collection 'docs'").is_not_found());
        assert!(!Error::invalid_input("empty ids").is_not_found());
        assert!(!Error::dimension_mismatch(3, 4).is_not_found());
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = Error::dimension_mismatch(1536, 384);
        assert_eq!(
            err.to_string(),
            "Invalid vector dimensions: expected 1536, got 384"
        );
    }
}
