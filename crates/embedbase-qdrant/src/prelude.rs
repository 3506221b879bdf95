//! Convenience re-exports for common types and traits.
//!
//! Brings the adapter and the storage contract it implements into scope with a
//! single `use embedbase_qdrant::prelude::*;`.

pub use embedbase_data::{
    Dataset, DistinctBy, Document, SearchQuery, SearchResponse, SelectQuery, SelectResponse,
    UpdateOptions, VectorDatabase,
};

pub use crate::client::{Distance, QdrantClient, QdrantConfig};
pub use crate::database::QdrantDatabase;
pub use crate::error::{Error, Result};
