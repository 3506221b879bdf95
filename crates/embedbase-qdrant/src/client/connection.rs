//! High-level Qdrant client with collection bookkeeping.

use std::collections::HashSet;
use std::sync::Arc;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfig;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Filter, PointStruct,
    RetrievedPoint, ScoredPoint, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use tokio::sync::{Mutex, RwLock};

use super::{HealthStatus, QdrantConfig};
use crate::error::{Error, Result};
use crate::{
    TRACING_TARGET_CLIENT, TRACING_TARGET_COLLECTIONS, TRACING_TARGET_POINTS,
    TRACING_TARGET_SEARCH,
};

/// High-level Qdrant client.
///
/// Cheap to clone: clones share the underlying gRPC channel and the cache of
/// collections this process knows to exist. The cache is best-effort; the
/// server stays the source of truth and a stale entry only costs one extra
/// round trip.
#[derive(Clone)]
pub struct QdrantClient {
    inner: Arc<QdrantClientInner>,
}

/// Internal client state.
struct QdrantClientInner {
    /// The underlying Qdrant client
    client: Qdrant,

    /// Configuration used to create this client
    config: QdrantConfig,

    /// Collections seen or created by this client
    known_collections: RwLock<HashSet<String>>,

    /// Serializes lazy collection creation
    creation_lock: Mutex<()>,
}

impl QdrantClient {
    /// Create a new Qdrant client with the given configuration.
    ///
    /// No request is sent; the channel connects lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or client creation fails.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CLIENT, fields(url = %config.qdrant_url))]
    pub fn new(config: QdrantConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            url = %config.qdrant_url,
            dimensions = config.dimensions(),
            distance = ?config.distance(),
            "Creating new Qdrant client"
        );

        let client = Qdrant::from_url(&config.qdrant_url)
            .api_key(config.qdrant_api_key.clone())
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_CLIENT,
                    error = %e,
                    url = %config.qdrant_url,
                    "Failed to create Qdrant client"
                );
                Error::Connection(e)
            })?;

        Ok(Self {
            inner: Arc::new(QdrantClientInner {
                client,
                config,
                known_collections: RwLock::new(HashSet::new()),
                creation_lock: Mutex::new(()),
            }),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &QdrantConfig {
        &self.inner.config
    }

    /// Get a reference to the raw Qdrant client for advanced operations.
    pub fn raw_client(&self) -> &Qdrant {
        &self.inner.client
    }

    /// Returns the collections this client has seen, sorted by name.
    pub async fn known_collections(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .inner
            .known_collections
            .read()
            .await
            .iter()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Queries the server health endpoint.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CLIENT)]
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let reply = self
            .inner
            .client
            .health_check()
            .await
            .map_err(|e| Error::from_qdrant("health_check", "", e))?;

        Ok(HealthStatus {
            title: reply.title,
            version: reply.version,
            commit: reply.commit,
        })
    }

    /// Creates a collection with the configured dimensionality and distance.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_COLLECTIONS, fields(collection = %name))]
    pub(crate) async fn create_collection(&self, name: &str) -> Result<()> {
        let config = &self.inner.config;
        let distance = qdrant_client::qdrant::Distance::from(config.distance());
        let vectors_config = VectorsConfig::Params(
            VectorParamsBuilder::new(config.dimensions() as u64, distance).build(),
        );

        self.inner
            .client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors_config))
            .await
            .map_err(|e| Error::from_qdrant("create_collection", name, e))?;

        tracing::info!(
            target: TRACING_TARGET_COLLECTIONS,
            collection = %name,
            dimensions = config.dimensions(),
            "Created Qdrant collection"
        );

        Ok(())
    }

    /// Makes sure a collection exists after a request reported it missing.
    pub(crate) async fn ensure_collection(&self, name: &str) -> Result<()> {
        self.ensure_collection_with(name, || self.create_collection(name))
            .await
    }

    /// Serialized lazy creation, with `create` issuing the actual request.
    ///
    /// A caller that waited on the lock while another one created the
    /// collection finds it in the cache and returns without calling `create`.
    /// A reply of `AlreadyExists` is treated as success.
    async fn ensure_collection_with<F, Fut>(&self, name: &str, create: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        // The caller just saw the collection missing, so any cached entry is stale.
        self.forget_collection(name).await;

        let _guard = self.inner.creation_lock.lock().await;

        if self.inner.known_collections.read().await.contains(name) {
            tracing::debug!(
                target: TRACING_TARGET_COLLECTIONS,
                collection = %name,
                "Collection created concurrently"
            );
            return Ok(());
        }

        match create().await {
            Ok(()) => {}
            Err(e) if e.is_collection_already_exists() => {
                tracing::debug!(
                    target: TRACING_TARGET_COLLECTIONS,
                    collection = %name,
                    "Collection already exists"
                );
            }
            Err(e) => return Err(e),
        }

        self.remember_collection(name).await;
        Ok(())
    }

    /// Insert or update points, waiting for the write to be applied.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_POINTS, fields(collection = %collection, point_count = points.len()))]
    pub(crate) async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<PointStruct>,
    ) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %collection,
            point_count = points.len(),
            "Upserting points"
        );

        self.inner
            .client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| log_failure("upsert_points", collection, e))?;

        self.remember_collection(collection).await;
        Ok(())
    }

    /// Scrolls through every point matching `filter`, payloads and vectors included.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_POINTS, fields(collection = %collection))]
    pub(crate) async fn scroll_points(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Vec<RetrievedPoint>> {
        let page_size = self.inner.config.scroll_page_size();
        let mut points = Vec::new();
        let mut offset = None;

        loop {
            let mut request = ScrollPointsBuilder::new(collection)
                .filter(filter.clone())
                .limit(page_size)
                .with_payload(true)
                .with_vectors(true);

            if let Some(offset) = offset.take() {
                request = request.offset(offset);
            }

            let response = self
                .inner
                .client
                .scroll(request)
                .await
                .map_err(|e| log_failure("scroll", collection, e))?;

            points.extend(response.result);

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %collection,
            point_count = points.len(),
            "Scroll completed"
        );

        Ok(points)
    }

    /// Nearest-neighbour search, payloads and vectors included.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_SEARCH, fields(collection = %collection, limit = limit))]
    pub(crate) async fn search_points(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<ScoredPoint>> {
        tracing::debug!(
            target: TRACING_TARGET_SEARCH,
            collection = %collection,
            vector_dim = vector.len(),
            limit = limit,
            filtered = filter.is_some(),
            "Performing vector search"
        );

        let mut request = SearchPointsBuilder::new(collection, vector, limit)
            .with_payload(true)
            .with_vectors(true);

        if let Some(filter) = filter {
            request = request.filter(filter);
        }

        let response = self
            .inner
            .client
            .search_points(request)
            .await
            .map_err(|e| log_failure("search_points", collection, e))?;

        tracing::debug!(
            target: TRACING_TARGET_SEARCH,
            collection = %collection,
            result_count = response.result.len(),
            "Vector search completed"
        );

        Ok(response.result)
    }

    /// Deletes every point matching `filter`, waiting for the write to be applied.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_POINTS, fields(collection = %collection))]
    pub(crate) async fn delete_points(&self, collection: &str, filter: Filter) -> Result<()> {
        self.inner
            .client
            .delete_points(DeletePointsBuilder::new(collection).points(filter).wait(true))
            .await
            .map_err(|e| log_failure("delete_points", collection, e))?;

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %collection,
            "Points deleted"
        );

        Ok(())
    }

    /// Lists collection names and refreshes the cache with them.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_COLLECTIONS)]
    pub(crate) async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .inner
            .client
            .list_collections()
            .await
            .map_err(|e| log_failure("list_collections", "", e))?;

        let names: Vec<String> = response
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect();

        *self.inner.known_collections.write().await = names.iter().cloned().collect();

        tracing::debug!(
            target: TRACING_TARGET_COLLECTIONS,
            collection_count = names.len(),
            "Listed collections"
        );

        Ok(names)
    }

    /// Exact number of points matching `filter`.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_COLLECTIONS, fields(collection = %collection))]
    pub(crate) async fn count_points(&self, collection: &str, filter: Filter) -> Result<u64> {
        let response = self
            .inner
            .client
            .count(CountPointsBuilder::new(collection).filter(filter).exact(true))
            .await
            .map_err(|e| log_failure("count", collection, e))?;

        Ok(response.result.map(|r| r.count).unwrap_or_default())
    }

    async fn remember_collection(&self, name: &str) {
        if !self.inner.known_collections.read().await.contains(name) {
            self.inner
                .known_collections
                .write()
                .await
                .insert(name.to_owned());
        }
    }

    async fn forget_collection(&self, name: &str) {
        self.inner.known_collections.write().await.remove(name);
    }
}

impl std::fmt::Debug for QdrantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantClient")
            .field("url", &self.inner.config.qdrant_url)
            .field("dimensions", &self.inner.config.dimensions())
            .finish_non_exhaustive()
    }
}

/// Classifies a failed request, logging it unless the collection is simply missing.
fn log_failure(
    operation: &'static str,
    collection: &str,
    error: qdrant_client::QdrantError,
) -> Error {
    let error = Error::from_qdrant(operation, collection, error);

    if error.is_collection_not_found() {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            operation,
            collection = %collection,
            "Collection does not exist"
        );
    } else {
        tracing::error!(
            target: TRACING_TARGET_CLIENT,
            error = %error,
            operation,
            collection = %collection,
            "Qdrant request failed"
        );
    }

    error
}
