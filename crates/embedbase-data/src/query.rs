//! Parameters for read and write operations.

use serde::{Deserialize, Serialize};

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::error::{Error, Result};

/// Default number of search results.
const DEFAULT_TOP_K: usize = 5;

/// Key used to de-duplicate documents gathered from several datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctBy {
    /// Keep one document per id.
    Id,
    /// Keep one document per content hash.
    Hash,
}

/// Point or hash lookup.
///
/// Documents matching any of `ids` or any of `hashes` are returned. When
/// `dataset_id` is unset every dataset is searched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// De-duplication applied when several datasets are read.
    #[serde(default)]
    pub distinct: Option<DistinctBy>,
}

impl SelectQuery {
    /// Selects documents by id.
    pub fn by_ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Selects documents by content hash.
    pub fn by_hashes(hashes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            hashes: hashes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Restricts the lookup to a single dataset.
    #[must_use]
    pub fn in_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Restricts the lookup to documents written by a user.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// De-duplicates multi-dataset results by the given key.
    #[must_use]
    pub fn distinct(mut self, by: DistinctBy) -> Self {
        self.distinct = Some(by);
        self
    }

    /// Checks that at least one id or hash was provided.
    pub fn validate(&self) -> Result<()> {
        if self.ids.is_empty() && self.hashes.is_empty() {
            return Err(Error::invalid_input("ids or hashes must be provided"));
        }
        Ok(())
    }
}

/// Similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    pub dataset_ids: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl SearchQuery {
    /// Searches the given dataset for the nearest neighbours of `vector`.
    pub fn new(vector: Vec<f32>, dataset_id: impl Into<String>) -> Self {
        Self {
            vector,
            top_k: DEFAULT_TOP_K,
            dataset_ids: vec![dataset_id.into()],
            user_id: None,
        }
    }

    /// Sets the number of results.
    #[must_use]
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Restricts the search to documents written by a user.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Checks that a dataset was named and results were requested.
    pub fn validate(&self) -> Result<()> {
        if self.dataset_ids.is_empty() {
            return Err(Error::invalid_input("at least one dataset id must be provided"));
        }
        if self.top_k == 0 {
            return Err(Error::invalid_input("top_k must be greater than zero"));
        }
        Ok(())
    }
}

/// Options for [`VectorDatabase::update`].
///
/// [`VectorDatabase::update`]: crate::VectorDatabase::update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Maximum number of documents sent per request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Whether the text payload is persisted next to the embedding.
    #[serde(default = "default_store_data")]
    pub store_data: bool,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_store_data() -> bool {
    true
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            user_id: None,
            batch_size: DEFAULT_BATCH_SIZE,
            store_data: true,
        }
    }
}

impl UpdateOptions {
    /// Attributes the written documents to a user.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Controls whether the text payload is persisted.
    #[must_use]
    pub fn store_data(mut self, store_data: bool) -> Self {
        self.store_data = store_data;
        self
    }

    /// Checks that the batch size is usable.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_input("batch_size must be greater than zero"));
        }
        Ok(())
    }
}
