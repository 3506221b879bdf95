//! Qdrant client connection management and configuration.

mod connection;
mod qdrant_config;

pub use connection::QdrantClient;
pub use qdrant_config::{Distance, QdrantConfig};

/// Health status of the Qdrant server
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    /// Title of the service
    pub title: String,
    /// Version of Qdrant
    pub version: String,
    /// Commit hash of the build
    pub commit: Option<String>,
}
