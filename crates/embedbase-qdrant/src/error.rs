//! Error types and utilities for Qdrant operations.
//!
//! Remote failures are classified once, when they leave the client wrapper:
//! gRPC `NotFound` becomes [`Error::CollectionNotFound`] and `AlreadyExists`
//! becomes [`Error::CollectionAlreadyExists`]. Everything else is kept as
//! [`Error::Request`] with the original client error as its source.

use qdrant_client::QdrantError;

/// Result type for all Qdrant operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// gRPC status code reported for a missing collection.
const GRPC_NOT_FOUND: i32 = 5;

/// gRPC status code reported when creating a collection that already exists.
const GRPC_ALREADY_EXISTS: i32 = 6;

/// Unified error type for Qdrant operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request to Qdrant failed for a reason other than a missing or duplicate collection
    #[error("Qdrant request '{operation}' failed on '{collection}': {source}")]
    Request {
        operation: &'static str,
        collection: String,
        #[source]
        source: QdrantError,
    },

    /// The client could not be built from its configuration
    #[error("Qdrant connection error: {0}")]
    Connection(#[source] QdrantError),

    /// Collection not found
    #[error("Collection '{name}' not found")]
    CollectionNotFound { name: String },

    /// Collection already exists
    #[error("Collection '{name}' already exists")]
    CollectionAlreadyExists { name: String },

    /// Invalid vector dimensions
    #[error("Invalid vector dimensions: expected {expected}, got {actual}")]
    InvalidVectorDimensions { expected: usize, actual: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors when encoding or decoding payloads
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Classifies a failed client call.
    pub(crate) fn from_qdrant(
        operation: &'static str,
        collection: impl Into<String>,
        error: QdrantError,
    ) -> Self {
        let collection = collection.into();
        match grpc_code(&error) {
            Some(GRPC_NOT_FOUND) => Self::CollectionNotFound { name: collection },
            Some(GRPC_ALREADY_EXISTS) => Self::CollectionAlreadyExists { name: collection },
            _ => Self::Request {
                operation,
                collection,
                source: error,
            },
        }
    }

    /// Create a collection not found error
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Create a collection already exists error
    pub fn collection_already_exists(name: impl Into<String>) -> Self {
        Self::CollectionAlreadyExists { name: name.into() }
    }

    /// Create an invalid vector dimensions error
    pub fn invalid_vector_dimensions(expected: usize, actual: usize) -> Self {
        Self::InvalidVectorDimensions { expected, actual }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Returns whether the target collection does not exist.
    pub fn is_collection_not_found(&self) -> bool {
        matches!(self, Self::CollectionNotFound { .. })
    }

    /// Returns whether the target collection was already created.
    pub fn is_collection_already_exists(&self) -> bool {
        matches!(self, Self::CollectionAlreadyExists { .. })
    }
}

fn grpc_code(error: &QdrantError) -> Option<i32> {
    match error {
        QdrantError::ResponseError { status } => Some(status.code().into()),
        _ => None,
    }
}

impl From<Error> for embedbase_data::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::CollectionNotFound { name } => {
                Self::not_found(format!("collection '{name}'"))
            }
            Error::InvalidVectorDimensions { expected, actual } => {
                Self::dimension_mismatch(expected, actual)
            }
            Error::InvalidInput(reason) | Error::InvalidConfig { reason } => {
                Self::invalid_input(reason)
            }
            Error::Serialization(e) => Self::Serialization(e),
            other => Self::backend_with_source(other.to_string(), other),
        }
    }
}
