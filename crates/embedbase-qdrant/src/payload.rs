//! Point payload layout and conversions.

use std::collections::HashMap;

use embedbase_data::{Document, SearchResponse, SelectResponse};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    ListValue, PointStruct, RetrievedPoint, ScoredPoint, Struct, Value, VectorsOutput,
};
use serde::Serialize;

use crate::error::Result;
use crate::point::{PointKey, point_id_to_string};

/// Payload key holding the owning user, used by every user-scoped filter.
pub(crate) const FIELD_USER_ID: &str = "user_id";

/// Payload key holding the content hash, used by hash lookups.
pub(crate) const FIELD_HASH: &str = "hash";

/// Payload stored next to every embedding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct DocumentPayload {
    pub dataset_id: Option<String>,
    pub user_id: Option<String>,
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub hash: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl DocumentPayload {
    /// Builds the payload of a document written to `dataset_id`.
    pub fn new(
        document: &Document,
        dataset_id: &str,
        user_id: Option<&str>,
        store_data: bool,
    ) -> Self {
        Self {
            dataset_id: Some(dataset_id.to_owned()),
            user_id: user_id.filter(|u| !u.is_empty()).map(str::to_owned),
            document_id: Some(document.id.clone()),
            data: store_data.then(|| document.data.clone()).flatten(),
            hash: Some(document.hash.clone()),
            metadata: document.metadata.clone(),
        }
    }

    /// Encodes the payload as Qdrant values.
    pub fn into_qdrant(self) -> Result<HashMap<String, Value>> {
        let fields = match serde_json::to_value(self)? {
            serde_json::Value::Object(fields) => fields,
            _ => serde_json::Map::new(),
        };

        Ok(fields
            .into_iter()
            .map(|(k, v)| (k, json_to_qdrant_value(v)))
            .collect())
    }

    /// Decodes a payload read back from Qdrant.
    ///
    /// Each field is read on its own: unknown keys are ignored, and missing
    /// keys or keys of an unexpected type are left empty, so points written by
    /// other tools still decode. Numbers and booleans in text fields are
    /// rendered as strings.
    pub fn from_qdrant(mut payload: HashMap<String, Value>) -> Self {
        let mut text = |key: &str| payload.remove(key).and_then(qdrant_value_to_text);

        let dataset_id = text("dataset_id");
        let user_id = text("user_id");
        let document_id = text("document_id");
        let data = text("data");
        let hash = text(FIELD_HASH);

        let metadata = payload
            .remove("metadata")
            .map(qdrant_value_to_json)
            .filter(|value| !value.is_null());

        Self {
            dataset_id,
            user_id,
            document_id,
            data,
            hash,
            metadata,
        }
    }
}

/// Reads a scalar payload value as text.
fn qdrant_value_to_text(value: Value) -> Option<String> {
    match value.kind? {
        Kind::StringValue(s) => Some(s),
        Kind::IntegerValue(i) => Some(i.to_string()),
        Kind::DoubleValue(f) => Some(f.to_string()),
        Kind::BoolValue(b) => Some(b.to_string()),
        Kind::NullValue(_) | Kind::ListValue(_) | Kind::StructValue(_) => None,
    }
}

/// Builds the point a document is stored as.
pub(crate) fn document_to_point(
    document: Document,
    dataset_id: &str,
    user_id: Option<&str>,
    store_data: bool,
) -> Result<PointStruct> {
    let payload = DocumentPayload::new(&document, dataset_id, user_id, store_data).into_qdrant()?;
    let key = PointKey::from_document_id(&document.id);

    Ok(PointStruct::new(key, document.embedding, payload))
}

/// Converts a point returned by a scroll into a select response.
pub(crate) fn retrieved_to_select(point: RetrievedPoint) -> SelectResponse {
    let payload = DocumentPayload::from_qdrant(point.payload);

    SelectResponse {
        id: resolve_id(payload.document_id, point.id),
        data: payload.data,
        metadata: payload.metadata,
        hash: payload.hash,
        embedding: extract_vector(point.vectors).unwrap_or_default(),
    }
}

/// Converts a point returned by a search into a search response.
pub(crate) fn scored_to_search(point: ScoredPoint) -> SearchResponse {
    let payload = DocumentPayload::from_qdrant(point.payload);

    SearchResponse {
        id: resolve_id(payload.document_id, point.id),
        score: point.score,
        data: payload.data,
        metadata: payload.metadata,
        hash: payload.hash,
        embedding: extract_vector(point.vectors).unwrap_or_default(),
    }
}

/// Prefers the original document id over the engine's point id.
fn resolve_id(document_id: Option<String>, point_id: Option<qdrant_client::qdrant::PointId>) -> String {
    document_id
        .or_else(|| point_id_to_string(point_id))
        .unwrap_or_default()
}

/// Extracts the unnamed vector from Qdrant's VectorsOutput.
fn extract_vector(vectors: Option<VectorsOutput>) -> Option<Vec<f32>> {
    vectors.and_then(|v| match v.vectors_options {
        #[allow(deprecated)]
        Some(VectorsOptions::Vector(vector)) => Some(vector.data),
        _ => None,
    })
}

/// Converts JSON value to Qdrant value.
pub(crate) fn json_to_qdrant_value(value: serde_json::Value) -> Value {
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Kind::IntegerValue(i)
            } else if let Some(f) = n.as_f64() {
                Kind::DoubleValue(f)
            } else {
                Kind::StringValue(n.to_string())
            }
        }
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(arr) => Kind::ListValue(ListValue {
            values: arr.into_iter().map(json_to_qdrant_value).collect(),
        }),
        serde_json::Value::Object(obj) => Kind::StructValue(Struct {
            fields: obj
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };

    Value { kind: Some(kind) }
}

/// Converts Qdrant value to JSON value.
pub(crate) fn qdrant_value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::json!(i),
        Some(Kind::DoubleValue(f)) => serde_json::json!(f),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(qdrant_value_to_json).collect(),
        ),
        Some(Kind::StructValue(obj)) => serde_json::Value::Object(
            obj.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}
