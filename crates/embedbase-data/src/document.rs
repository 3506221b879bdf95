//! Documents written to a vector database and the projections read back.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A piece of content and its embedding, as handed to [`VectorDatabase::update`].
///
/// [`VectorDatabase::update`]: crate::VectorDatabase::update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Document {
    /// Unique identifier within the dataset.
    pub id: String,
    /// Text payload the embedding was computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Content hash, hex-encoded SHA-256 of `data` by convention.
    #[serde(default)]
    pub hash: String,
    /// Arbitrary caller metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// The embedding vector.
    pub embedding: Vec<f32>,
}

impl Document {
    /// Creates a document with an id and embedding.
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            data: None,
            hash: String::new(),
            metadata: None,
            embedding,
        }
    }

    /// Sets the text payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the content hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Fills `hash` from the text payload using [`Document::content_hash`].
    #[must_use]
    pub fn with_computed_hash(mut self) -> Self {
        self.hash = Self::content_hash(self.data.as_deref().unwrap_or_default());
        self
    }

    /// Hex-encoded SHA-256 of the given text.
    pub fn content_hash(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }

    /// Returns the embedding length.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// A stored document returned by a point or hash lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SelectResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// A stored document returned by a similarity search, with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SearchResponse {
    pub id: String,
    /// Similarity score as reported by the engine, higher is closer.
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// A named collection of documents and its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Dataset {
    pub dataset_id: String,
    pub documents_count: u64,
}
