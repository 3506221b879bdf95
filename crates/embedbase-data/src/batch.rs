//! Splitting writes into request-sized batches.

/// Number of documents per write request unless the caller says otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Splits `items` into ordered batches of at most `batch_size` elements.
///
/// A `batch_size` of zero is treated as one.
pub fn batches<T>(items: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        batches.push(items.by_ref().take(batch_size).collect());
    }

    batches
}
