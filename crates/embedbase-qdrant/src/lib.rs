#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for Qdrant client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "embedbase_qdrant::client";

/// Tracing target for Qdrant collection operations.
///
/// Use this target for logging lazy collection creation, listing, and counting.
pub const TRACING_TARGET_COLLECTIONS: &str = "embedbase_qdrant::collections";

/// Tracing target for Qdrant point operations.
///
/// Use this target for logging upserts, scrolls, and deletes.
pub const TRACING_TARGET_POINTS: &str = "embedbase_qdrant::points";

/// Tracing target for Qdrant search operations.
///
/// Use this target for logging vector searches and their filters.
pub const TRACING_TARGET_SEARCH: &str = "embedbase_qdrant::search";

mod client;
mod collection;
mod database;
mod error;
mod filter;
mod payload;
mod point;
#[doc(hidden)]
pub mod prelude;
mod scatter;

pub use client::{Distance, HealthStatus, QdrantClient, QdrantConfig};
pub use database::QdrantDatabase;
pub use error::{Error, Result};
pub use point::PointKey;
