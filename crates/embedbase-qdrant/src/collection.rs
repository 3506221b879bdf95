//! Collection lifecycle policies shared by the database operations.

use std::future::Future;

use crate::TRACING_TARGET_COLLECTIONS;
use crate::error::Result;

/// Runs `operation`, creating the collection and retrying once if it is missing.
///
/// Only [`Error::CollectionNotFound`] triggers `create`; any other failure,
/// including one from `create` or from the retry, is returned unchanged.
///
/// [`Error::CollectionNotFound`]: crate::Error::CollectionNotFound
pub(crate) async fn create_on_missing<F, Fut, C, CFut, T>(
    collection: &str,
    mut operation: F,
    create: C,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: FnOnce() -> CFut,
    CFut: Future<Output = Result<()>>,
{
    match operation().await {
        Err(err) if err.is_collection_not_found() => {
            tracing::info!(
                target: TRACING_TARGET_COLLECTIONS,
                collection = %collection,
                "Collection missing, creating it before retrying"
            );

            create().await?;
            operation().await
        }
        result => result,
    }
}

/// Treats a missing collection as an empty one.
pub(crate) fn tolerate_missing<T: Default>(collection: &str, result: Result<T>) -> Result<T> {
    match result {
        Err(err) if err.is_collection_not_found() => {
            tracing::debug!(
                target: TRACING_TARGET_COLLECTIONS,
                collection = %collection,
                "Collection does not exist, nothing to do"
            );
            Ok(T::default())
        }
        result => result,
    }
}
