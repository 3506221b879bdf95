//! [`VectorDatabase`] implementation backed by Qdrant.

use async_trait::async_trait;
use embedbase_data::{
    Dataset, Document, Result as DataResult, SearchQuery, SearchResponse, SelectQuery,
    SelectResponse, UpdateOptions, VectorDatabase, batches,
};
use futures::future::try_join_all;
use qdrant_client::qdrant::{Filter, PointStruct};

use crate::client::{QdrantClient, QdrantConfig};
use crate::collection::{create_on_missing, tolerate_missing};
use crate::error::{Error, Result};
use crate::{TRACING_TARGET_COLLECTIONS, TRACING_TARGET_POINTS, TRACING_TARGET_SEARCH};
use crate::{filter, payload, scatter};

/// Embedding storage where every dataset is a Qdrant collection.
///
/// Collections are created on the first write with the configured
/// dimensionality and distance.
#[derive(Debug, Clone)]
pub struct QdrantDatabase {
    client: QdrantClient,
}

impl QdrantDatabase {
    /// Creates a database over a new client built from `config`.
    pub fn new(config: QdrantConfig) -> Result<Self> {
        Ok(Self::from_client(QdrantClient::new(config)?))
    }

    /// Creates a database over an existing client.
    pub fn from_client(client: QdrantClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &QdrantClient {
        &self.client
    }

    fn check_dimensions(&self, actual: usize) -> Result<()> {
        let expected = self.client.config().dimensions();
        if actual != expected {
            return Err(Error::invalid_vector_dimensions(expected, actual));
        }
        Ok(())
    }

    /// Reads the matching points of one collection; a missing collection is empty.
    async fn scroll_collection(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Vec<SelectResponse>> {
        let points = tolerate_missing(
            collection,
            self.client.scroll_points(collection, filter).await,
        )?;

        Ok(points
            .into_iter()
            .map(payload::retrieved_to_select)
            .collect())
    }

    /// Upserts one batch, creating the collection if it does not exist yet.
    async fn write_batch(&self, dataset_id: &str, points: Vec<PointStruct>) -> Result<()> {
        create_on_missing(
            dataset_id,
            || self.client.upsert_points(dataset_id, points.clone()),
            || self.client.ensure_collection(dataset_id),
        )
        .await
    }

    /// Counts the points of one collection; `None` if it vanished after listing.
    async fn count_collection(&self, collection: String, filter: Filter) -> Result<Option<Dataset>> {
        match self.client.count_points(&collection, filter).await {
            Ok(documents_count) => Ok(Some(Dataset {
                dataset_id: collection,
                documents_count,
            })),
            Err(err) if err.is_collection_not_found() => {
                tracing::debug!(
                    target: TRACING_TARGET_COLLECTIONS,
                    collection = %collection,
                    "Collection removed while listing datasets"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl VectorDatabase for QdrantDatabase {
    async fn select(&self, query: SelectQuery) -> DataResult<Vec<SelectResponse>> {
        query.validate()?;

        let filter = filter::select_filter(&query.ids, &query.hashes, query.user_id.as_deref());

        let collections = match &query.dataset_id {
            Some(dataset_id) => vec![dataset_id.clone()],
            None => self.client.list_collections().await?,
        };

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection_count = collections.len(),
            id_count = query.ids.len(),
            hash_count = query.hashes.len(),
            "Selecting documents"
        );

        let reads = collections
            .iter()
            .map(|collection| self.scroll_collection(collection, filter.clone()));
        let results = try_join_all(reads).await?;

        Ok(scatter::merge(results, query.distinct))
    }

    async fn update(
        &self,
        documents: Vec<Document>,
        dataset_id: &str,
        options: UpdateOptions,
    ) -> DataResult<()> {
        options.validate()?;

        if documents.is_empty() {
            return Ok(());
        }

        for document in &documents {
            self.check_dimensions(document.dimensions())?;
        }

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %dataset_id,
            document_count = documents.len(),
            batch_size = options.batch_size,
            "Updating documents"
        );

        let user_id = options.user_id.as_deref();
        let points = documents
            .into_iter()
            .map(|document| {
                payload::document_to_point(document, dataset_id, user_id, options.store_data)
            })
            .collect::<Result<Vec<_>>>()?;

        let writes = batches(points, options.batch_size)
            .into_iter()
            .map(|batch| self.write_batch(dataset_id, batch));
        try_join_all(writes).await?;

        Ok(())
    }

    async fn delete(
        &self,
        ids: Vec<String>,
        dataset_id: &str,
        user_id: Option<&str>,
    ) -> DataResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %dataset_id,
            id_count = ids.len(),
            "Deleting documents"
        );

        let filter = filter::delete_filter(&ids, user_id);
        tolerate_missing(
            dataset_id,
            self.client.delete_points(dataset_id, filter).await,
        )?;

        Ok(())
    }

    async fn search(&self, query: SearchQuery) -> DataResult<Vec<SearchResponse>> {
        query.validate()?;
        self.check_dimensions(query.vector.len())?;

        let SearchQuery {
            vector,
            top_k,
            dataset_ids,
            user_id,
        } = query;

        let Some((dataset_id, ignored)) = dataset_ids.split_first() else {
            return Ok(Vec::new());
        };

        if !ignored.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET_SEARCH,
                collection = %dataset_id,
                ignored = ?ignored,
                "Searching several datasets is not supported, only the first one is searched"
            );
        }

        let points = tolerate_missing(
            dataset_id,
            self.client
                .search_points(
                    dataset_id,
                    vector,
                    top_k as u64,
                    filter::search_filter(user_id.as_deref()),
                )
                .await,
        )?;

        Ok(points
            .into_iter()
            .map(payload::scored_to_search)
            .collect())
    }

    async fn clear(&self, dataset_id: &str, user_id: Option<&str>) -> DataResult<()> {
        tracing::info!(
            target: TRACING_TARGET_POINTS,
            collection = %dataset_id,
            user_scoped = user_id.is_some(),
            "Clearing dataset"
        );

        tolerate_missing(
            dataset_id,
            self.client
                .delete_points(dataset_id, filter::user_filter(user_id))
                .await,
        )?;

        Ok(())
    }

    async fn get_datasets(&self, user_id: Option<&str>) -> DataResult<Vec<Dataset>> {
        let collections = self.client.list_collections().await?;
        let filter = filter::user_filter(user_id);

        let counts = collections
            .into_iter()
            .map(|collection| self.count_collection(collection, filter.clone()));

        let mut datasets: Vec<Dataset> = try_join_all(counts).await?.into_iter().flatten().collect();
        datasets.sort_by(|a, b| a.dataset_id.cmp(&b.dataset_id));

        Ok(datasets)
    }

    fn dimensions(&self) -> usize {
        self.client.config().dimensions()
    }
}

#[cfg(test)]
mod tests {
    use embedbase_data::{DistinctBy, Error as DataError};
    use serde_json::json;

    use super::*;

    const LIVE_DIMENSIONS: usize = 1536;

    fn offline_database(dimensions: usize) -> QdrantDatabase {
        // Port 9 is never a Qdrant endpoint; tests using this client must fail
        // before reaching the network.
        let config = QdrantConfig::new("http://127.0.0.1:9")
            .with_dimensions(dimensions)
            .with_connect_timeout_secs(1)
            .with_request_timeout_secs(1);
        QdrantDatabase::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_update_rejects_wrong_dimensions() {
        let db = offline_database(4);
        let documents = vec![Document::new("a", vec![0.0; 3]).with_computed_hash()];

        let err = db
            .update(documents, "unit_test", UpdateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DataError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_update_empty_is_noop() {
        let db = offline_database(4);
        db.update(Vec::new(), "unit_test", UpdateOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_rejects_zero_batch_size() {
        let db = offline_database(4);
        let documents = vec![Document::new("a", vec![0.0; 4])];

        let err = db
            .update(documents, "unit_test", UpdateOptions::default().batch_size(0))
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_dimensions() {
        let db = offline_database(4);
        let err = db
            .search(SearchQuery::new(vec![0.0; 5], "unit_test"))
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_search_requires_dataset() {
        let db = offline_database(4);
        let mut query = SearchQuery::new(vec![0.0; 4], "unit_test");
        query.dataset_ids.clear();

        assert!(matches!(
            db.search(query).await,
            Err(DataError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_select_requires_ids_or_hashes() {
        let db = offline_database(4);
        let query = SelectQuery::default().in_dataset("unit_test");

        assert!(matches!(
            db.select(query).await,
            Err(DataError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_without_ids_is_noop() {
        let db = offline_database(4);
        db.delete(Vec::new(), "unit_test", None).await.unwrap();
    }

    #[test]
    fn test_dimensions_come_from_config() {
        assert_eq!(offline_database(384).dimensions(), 384);
    }

    // Acceptance tests against a live server. Set QDRANT_URL (or put it in
    // `.env`) and run with `--ignored`.

    fn live_database() -> QdrantDatabase {
        let _ = dotenvy::dotenv();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let url = std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".into());
        let mut config = QdrantConfig::new(url).with_dimensions(LIVE_DIMENSIONS);
        if let Ok(api_key) = std::env::var("QDRANT_API_KEY") {
            config = config.with_api_key(api_key);
        }

        QdrantDatabase::new(config).unwrap()
    }

    /// Embedding whose direction depends on `seed`.
    fn embedding(seed: usize) -> Vec<f32> {
        (0..LIVE_DIMENSIONS)
            .map(|i| if i % 16 == seed % 16 { 1.0 } else { 0.01 })
            .collect()
    }

    fn document(id: &str, text: &str, seed: usize) -> Document {
        Document::new(id, embedding(seed))
            .with_data(text)
            .with_metadata(json!({ "test": "test" }))
            .with_computed_hash()
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_insert_then_search() {
        let db = live_database();
        let dataset = "embedbase_unit_test_search";
        db.clear(dataset, None).await.unwrap();

        let documents = vec![
            document("bob", "Bob is a human", 0),
            document("alice", "Alice is a human", 1),
            document("rex", "Rex is a dog", 2),
        ];
        db.update(documents, dataset, UpdateOptions::default())
            .await
            .unwrap();

        let results = db
            .search(SearchQuery::new(embedding(0), dataset).top_k(2))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "bob");
        assert_eq!(results[0].data.as_deref(), Some("Bob is a human"));
        assert_eq!(results[0].metadata.as_ref().unwrap()["test"], json!("test"));
        assert_eq!(results[0].embedding.len(), LIVE_DIMENSIONS);

        db.clear(dataset, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_fetch_by_id() {
        let db = live_database();
        let dataset = "embedbase_unit_test_fetch";
        db.clear(dataset, None).await.unwrap();

        db.update(
            vec![document("bob", "Bob is a human", 0)],
            dataset,
            UpdateOptions::default(),
        )
        .await
        .unwrap();

        let results = db
            .select(SelectQuery::by_ids(["bob"]).in_dataset(dataset))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "bob");
        assert_eq!(results[0].embedding, embedding(0));

        db.clear(dataset, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_fetch_by_hash() {
        let db = live_database();
        let dataset = "embedbase_unit_test_fetch_hash";
        db.clear(dataset, None).await.unwrap();

        db.update(
            vec![document("bob", "Bob is a human", 0)],
            dataset,
            UpdateOptions::default(),
        )
        .await
        .unwrap();

        let hash = Document::content_hash("Bob is a human");
        let results = db
            .select(SelectQuery::by_hashes([hash.clone()]).in_dataset(dataset))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hash.as_deref(), Some(hash.as_str()));

        db.clear(dataset, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_clear() {
        let db = live_database();
        let dataset = "embedbase_unit_test_clear";

        db.update(
            vec![document("bob", "Bob is a human", 0)],
            dataset,
            UpdateOptions::default(),
        )
        .await
        .unwrap();
        db.clear(dataset, None).await.unwrap();

        let results = db
            .search(SearchQuery::new(embedding(0), dataset))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_missing_collection_is_empty() {
        let db = live_database();
        let dataset = "embedbase_unit_test_never_written";

        db.clear(dataset, None).await.unwrap();
        db.delete(vec!["x".into()], dataset, None).await.unwrap();

        let selected = db
            .select(SelectQuery::by_ids(["x"]).in_dataset(dataset))
            .await
            .unwrap();
        assert!(selected.is_empty());

        let found = db
            .search(SearchQuery::new(embedding(0), dataset))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_upload_keeps_content() {
        let db = live_database();
        let dataset = "embedbase_unit_test_upload";
        db.clear(dataset, None).await.unwrap();

        let documents: Vec<_> = (0..10)
            .map(|i| document(&format!("doc-{i}"), &format!("text {i}"), i))
            .collect();
        db.update(documents, dataset, UpdateOptions::default().batch_size(3))
            .await
            .unwrap();

        let ids: Vec<String> = (0..10).map(|i| format!("doc-{i}")).collect();
        let mut results = db
            .select(SelectQuery::by_ids(ids).in_dataset(dataset))
            .await
            .unwrap();
        results.sort_by_key(|r| r.id.clone());

        assert_eq!(results.len(), 10);
        for result in &results {
            let n = result.id.trim_start_matches("doc-");
            assert_eq!(result.data.as_deref(), Some(format!("text {n}").as_str()));
        }

        db.clear(dataset, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_user_scoping() {
        let db = live_database();
        let dataset = "embedbase_unit_test_users";
        db.clear(dataset, None).await.unwrap();

        db.update(
            vec![document("a", "owned by alice", 0)],
            dataset,
            UpdateOptions::default().for_user("alice"),
        )
        .await
        .unwrap();
        db.update(
            vec![document("b", "owned by bob", 1)],
            dataset,
            UpdateOptions::default().for_user("bob"),
        )
        .await
        .unwrap();

        let alice = db
            .select(
                SelectQuery::by_ids(["a", "b"])
                    .in_dataset(dataset)
                    .for_user("alice"),
            )
            .await
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id, "a");

        db.clear(dataset, Some("alice")).await.unwrap();
        let remaining = db
            .select(SelectQuery::by_ids(["a", "b"]).in_dataset(dataset))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");

        db.clear(dataset, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_batch_select_large_content() {
        let db = live_database();
        let dataset = "embedbase_unit_test_large";
        db.clear(dataset, None).await.unwrap();

        let documents: Vec<_> = (0..1000)
            .map(|i| document(&format!("large-{i}"), &format!("large content {i}"), i))
            .collect();
        let hashes: Vec<String> = documents.iter().map(|d| d.hash.clone()).collect();

        db.update(documents, dataset, UpdateOptions::default())
            .await
            .unwrap();

        let results = db
            .select(SelectQuery::by_hashes(hashes).in_dataset(dataset))
            .await
            .unwrap();
        assert_eq!(results.len(), 1000);

        db.clear(dataset, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_select_across_collections() {
        let db = live_database();
        let datasets = ["embedbase_unit_test_multi_a", "embedbase_unit_test_multi_b"];

        for dataset in datasets {
            db.clear(dataset, None).await.unwrap();
            db.update(
                vec![
                    document("multi-1", "first shared", 0),
                    document("multi-2", "second shared", 1),
                ],
                dataset,
                UpdateOptions::default(),
            )
            .await
            .unwrap();
        }

        let all = db
            .select(SelectQuery::by_ids(["multi-1", "multi-2"]))
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let distinct = db
            .select(SelectQuery::by_ids(["multi-1", "multi-2"]).distinct(DistinctBy::Id))
            .await
            .unwrap();
        assert_eq!(distinct.len(), 2);

        for dataset in datasets {
            db.clear(dataset, None).await.unwrap();
        }
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_live_get_datasets() {
        let db = live_database();
        let dataset = "embedbase_unit_test_datasets";
        db.clear(dataset, None).await.unwrap();

        db.update(
            vec![
                document("d-1", "one", 0),
                document("d-2", "two", 1),
            ],
            dataset,
            UpdateOptions::default(),
        )
        .await
        .unwrap();

        let datasets = db.get_datasets(None).await.unwrap();
        let names: Vec<_> = datasets.iter().map(|d| d.dataset_id.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        let entry = datasets
            .iter()
            .find(|d| d.dataset_id == dataset)
            .unwrap();
        assert_eq!(entry.documents_count, 2);

        db.clear(dataset, None).await.unwrap();
    }
}
