//! Mapping between document ids and Qdrant point ids.
//!
//! Qdrant only accepts unsigned integers and UUIDs as point ids, while
//! documents carry arbitrary strings. Ids already written in the canonical form
//! of one of the accepted shapes are used as-is; any other string is hashed
//! into a name-based UUID so the same document always lands on the same point
//! and two distinct ids never share one.

use derive_more::{Display, From};
use qdrant_client::qdrant::PointId;
use qdrant_client::qdrant::point_id::PointIdOptions;
use uuid::Uuid;

/// Namespace for UUIDs derived from free-form document ids.
const DOCUMENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b8e_54d3_4e0a_9c57_3a9e_d1b2_c4f8);

/// A point id accepted by Qdrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
pub enum PointKey {
    /// UUID-based id
    #[display("{_0}")]
    Uuid(Uuid),
    /// Numeric id
    #[display("{_0}")]
    Num(u64),
}

impl PointKey {
    /// Maps a document id onto the point id it is stored under.
    ///
    /// Only lowercase hyphenated UUIDs and decimal numbers without leading
    /// zeros are kept, since Qdrant renders ids back in exactly those forms.
    pub fn from_document_id(id: &str) -> Self {
        if let Ok(uuid) = Uuid::parse_str(id)
            && uuid.hyphenated().to_string() == id
        {
            return Self::Uuid(uuid);
        }

        if let Ok(num) = id.parse::<u64>()
            && num.to_string() == id
        {
            return Self::Num(num);
        }

        Self::Uuid(Uuid::new_v5(&DOCUMENT_ID_NAMESPACE, id.as_bytes()))
    }
}

impl From<PointKey> for PointId {
    fn from(key: PointKey) -> Self {
        match key {
            PointKey::Uuid(uuid) => PointId::from(uuid.to_string()),
            PointKey::Num(num) => PointId::from(num),
        }
    }
}

/// Renders a point id returned by Qdrant as a string.
pub(crate) fn point_id_to_string(id: Option<PointId>) -> Option<String> {
    match id {
        Some(PointId {
            point_id_options: Some(id),
        }) => match id {
            PointIdOptions::Num(n) => Some(n.to_string()),
            PointIdOptions::Uuid(s) => Some(s),
        },
        _ => None,
    }
}
