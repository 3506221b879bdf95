//! Merging of results gathered from several collections.

use std::collections::HashMap;

use embedbase_data::{DistinctBy, SelectResponse};

/// De-duplication key of a merged document.
#[derive(Debug, PartialEq, Eq, Hash)]
enum MergeKey {
    Id(String),
    Hash(String),
}

impl MergeKey {
    fn of(document: &SelectResponse, by: DistinctBy) -> Self {
        match (by, document.hash.as_deref()) {
            (DistinctBy::Hash, Some(hash)) if !hash.is_empty() => Self::Hash(hash.to_owned()),
            _ => Self::Id(document.id.clone()),
        }
    }
}

/// Concatenates per-collection results, optionally keeping one document per key.
///
/// With a key, a later collection's document replaces an earlier one with the
/// same key. Documents without a hash fall back to their id when
/// de-duplicating by hash. Output order is unspecified.
pub(crate) fn merge(
    results: Vec<Vec<SelectResponse>>,
    distinct: Option<DistinctBy>,
) -> Vec<SelectResponse> {
    let all = results.into_iter().flatten();

    let Some(by) = distinct else {
        return all.collect();
    };

    let mut unique: HashMap<MergeKey, SelectResponse> = HashMap::new();
    for document in all {
        unique.insert(MergeKey::of(&document, by), document);
    }

    unique.into_values().collect()
}
