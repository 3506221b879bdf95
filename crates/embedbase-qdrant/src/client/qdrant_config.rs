//! Qdrant client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// Default values
const DEFAULT_URL: &str = "http://localhost:6334";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DIMENSIONS: usize = 1536;
const DEFAULT_SCROLL_PAGE_SIZE: u32 = 10_000;

/// Distance metric used when a collection is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Euclidean distance.
    Euclid,
    /// Dot product.
    Dot,
    /// Manhattan distance.
    Manhattan,
}

impl From<Distance> for qdrant_client::qdrant::Distance {
    fn from(distance: Distance) -> Self {
        match distance {
            Distance::Cosine => Self::Cosine,
            Distance::Euclid => Self::Euclid,
            Distance::Dot => Self::Dot,
            Distance::Manhattan => Self::Manhattan,
        }
    }
}

/// Configuration for the Qdrant integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct QdrantConfig {
    /// Qdrant gRPC endpoint (e.g., "http://localhost:6334")
    #[cfg_attr(
        feature = "config",
        arg(long = "qdrant-url", env = "QDRANT_URL", default_value = DEFAULT_URL)
    )]
    pub qdrant_url: String,

    /// API key for authentication (optional)
    #[cfg_attr(feature = "config", arg(long = "qdrant-api-key", env = "QDRANT_API_KEY"))]
    pub qdrant_api_key: Option<String>,

    /// Connection timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "qdrant-connect-timeout", env = "QDRANT_CONNECT_TIMEOUT_SECS")
    )]
    pub qdrant_connect_timeout: Option<u64>,

    /// Request timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "qdrant-request-timeout", env = "QDRANT_REQUEST_TIMEOUT_SECS")
    )]
    pub qdrant_request_timeout: Option<u64>,

    /// Embedding length of every collection created by the adapter
    #[cfg_attr(
        feature = "config",
        arg(long = "qdrant-dimensions", env = "QDRANT_DIMENSIONS")
    )]
    pub qdrant_dimensions: Option<usize>,

    /// Distance metric of every collection created by the adapter
    #[cfg_attr(
        feature = "config",
        arg(long = "qdrant-distance", env = "QDRANT_DISTANCE", value_enum)
    )]
    pub qdrant_distance: Option<Distance>,

    /// Points fetched per scroll request
    #[cfg_attr(
        feature = "config",
        arg(long = "qdrant-scroll-page-size", env = "QDRANT_SCROLL_PAGE_SIZE")
    )]
    pub qdrant_scroll_page_size: Option<u32>,
}

impl QdrantConfig {
    /// Create a new configuration for the given gRPC endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            qdrant_connect_timeout: None,
            qdrant_request_timeout: None,
            qdrant_dimensions: None,
            qdrant_distance: None,
            qdrant_scroll_page_size: None,
        }
    }

    /// Returns the connection timeout.
    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.qdrant_connect_timeout
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Returns the request timeout.
    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.qdrant_request_timeout
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Returns the embedding length of created collections.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.qdrant_dimensions.unwrap_or(DEFAULT_DIMENSIONS)
    }

    /// Returns the distance metric of created collections.
    #[inline]
    pub fn distance(&self) -> Distance {
        self.qdrant_distance.unwrap_or_default()
    }

    /// Returns the number of points fetched per scroll request.
    #[inline]
    pub fn scroll_page_size(&self) -> u32 {
        self.qdrant_scroll_page_size
            .unwrap_or(DEFAULT_SCROLL_PAGE_SIZE)
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.qdrant_url = url.into();
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.qdrant_api_key = Some(api_key.into());
        self
    }

    /// Set the connection timeout in seconds.
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.qdrant_connect_timeout = Some(secs);
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.qdrant_request_timeout = Some(secs);
        self
    }

    /// Set the embedding length of created collections.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.qdrant_dimensions = Some(dimensions);
        self
    }

    /// Set the distance metric of created collections.
    #[must_use]
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.qdrant_distance = Some(distance);
        self
    }

    /// Set the number of points fetched per scroll request.
    #[must_use]
    pub fn with_scroll_page_size(mut self, page_size: u32) -> Self {
        self.qdrant_scroll_page_size = Some(page_size);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.qdrant_url.is_empty() {
            return Err(Error::invalid_config("URL cannot be empty"));
        }

        if !self.qdrant_url.starts_with("http://") && !self.qdrant_url.starts_with("https://") {
            return Err(Error::invalid_config(
                "URL must start with http:// or https://",
            ));
        }

        if self.connect_timeout().is_zero() {
            return Err(Error::invalid_config(
                "Connect timeout must be greater than zero",
            ));
        }

        if self.request_timeout().is_zero() {
            return Err(Error::invalid_config(
                "Request timeout must be greater than zero",
            ));
        }

        if self.dimensions() == 0 {
            return Err(Error::invalid_config(
                "Dimensions must be greater than zero",
            ));
        }

        if self.scroll_page_size() == 0 {
            return Err(Error::invalid_config(
                "Scroll page size must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}
