//! Clients that pull raw material listings out of external sources.
//!
//! The sync pipeline only sees the [`ExtractionClient`] trait; the concrete
//! Firecrawl-backed implementation lives in [`firecrawl`], with deterministic
//! sample data in [`synthetic`] for development without an upstream account.
//! [`normalize`] turns the loosely-typed payloads into domain records.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub mod firecrawl;
pub mod normalize;
pub mod synthetic;

/// Errors surfaced while pulling listings from an extraction source.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The service answered but reported a failure of its own.
    #[error("extraction api error: {0}")]
    Api(String),
    /// The service answered with a non-success HTTP status.
    #[error("extraction service returned status {0}")]
    Status(u16),
    /// The request never completed (connect, timeout, body read).
    #[error("extraction transport error: {0}")]
    Http(#[from] reqwest::Error),
    /// The response decoded but did not have the promised shape.
    #[error("unexpected extraction payload: {0}")]
    InvalidPayload(String),
}

impl ExtractError {
    /// Whether retrying the same request can plausibly succeed.
    ///
    /// Rate limiting, upstream server errors and transport failures are
    /// transient; a malformed payload or an explicit API error is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Http(_) => true,
            Self::Api(_) | Self::InvalidPayload(_) => false,
        }
    }
}

/// A source of raw material listings, one category at a time.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Fetch up to `limit` raw listings for `category`.
    async fn fetch_category(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<RawProduct>, ExtractError>;
}

/// One listing as the extraction service returns it.
///
/// Every field is optional; [`normalize::normalize`] decides what survives.
/// Aliases accept the field spellings different extraction prompts produce.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default, alias = "product_id")]
    pub sku: Option<String>,
    #[serde(default, alias = "material_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "thumbnail_url")]
    pub image_url: Option<String>,
    #[serde(default, alias = "vendor_name")]
    pub vendor: Option<String>,
    /// Free-text stock note, e.g. "24 in stock".
    #[serde(default)]
    pub stock: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub availability: Option<String>,
}

/// Retry schedule for transient extraction failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; later retries double it each time.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: `base * 2^attempt` for the 1-based retry number.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// A policy with no delays, for tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
        }
    }
}

/// What to do once retries are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackMode {
    /// Propagate the error to the caller.
    #[default]
    None,
    /// Serve deterministic sample listings instead.
    Synthetic,
}
