//! The contract a vector database integration fulfils.

use async_trait::async_trait;

use crate::document::{Dataset, Document, SearchResponse, SelectResponse};
use crate::error::Result;
use crate::query::{SearchQuery, SelectQuery, UpdateOptions};

/// Storage backend for embeddings, grouped into named datasets.
///
/// Datasets are created implicitly by the first write. Reads, deletes and
/// clears against a dataset that does not exist yet succeed with an empty
/// result.
#[async_trait]
pub trait VectorDatabase: Send + Sync {
    /// Looks documents up by id or content hash.
    async fn select(&self, query: SelectQuery) -> Result<Vec<SelectResponse>>;

    /// Inserts or replaces documents in a dataset.
    async fn update(
        &self,
        documents: Vec<Document>,
        dataset_id: &str,
        options: UpdateOptions,
    ) -> Result<()>;

    /// Deletes documents by id.
    async fn delete(&self, ids: Vec<String>, dataset_id: &str, user_id: Option<&str>)
    -> Result<()>;

    /// Returns the documents nearest to the query vector.
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResponse>>;

    /// Removes every document of a dataset, or only those of `user_id`.
    async fn clear(&self, dataset_id: &str, user_id: Option<&str>) -> Result<()>;

    /// Lists datasets with their document counts.
    async fn get_datasets(&self, user_id: Option<&str>) -> Result<Vec<Dataset>>;

    /// Embedding length every document must have.
    fn dimensions(&self) -> usize;
}
