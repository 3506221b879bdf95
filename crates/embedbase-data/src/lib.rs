#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod batch;
mod database;
mod document;
mod error;
mod query;

pub use batch::{DEFAULT_BATCH_SIZE, batches};
pub use database::VectorDatabase;
pub use document::{Dataset, Document, SearchResponse, SelectResponse};
pub use error::{BoxError, Error, Result};
pub use query::{DistinctBy, SearchQuery, SelectQuery, UpdateOptions};
