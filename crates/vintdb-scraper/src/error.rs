use thiserror::Error;
use vintdb_core::KeywordError;

use crate::extract::AmbiguousAge;

/// Errors from the search API client. Every variant aborts the run that
/// triggered it; transient ones are retried first (see [`crate::rate_limit`]).
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by search API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Non-2xx response carrying the API's `error` / `error_description` body.
    #[error("search API error {status} ({error}): {description}")]
    Api {
        status: u16,
        error: String,
        description: String,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// A problem confined to one listing. The pipeline skips the listing and
/// logs it, unless strict mode promotes it to [`PipelineError::Listing`].
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing #{index} ({}) does not match the expected schema: {reason}", .item_code.as_deref().unwrap_or("unknown item code"))]
    SchemaMismatch {
        index: usize,
        item_code: Option<String>,
        reason: String,
    },

    #[error("listing {item_code}: {source}")]
    AmbiguousAge {
        item_code: String,
        #[source]
        source: AmbiguousAge,
    },
}

impl ListingError {
    /// Short machine-readable kind, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ListingError::SchemaMismatch { .. } => "schema_mismatch",
            ListingError::AmbiguousAge { .. } => "ambiguous_age",
        }
    }
}

/// Fatal pipeline failures. No records are emitted when one occurs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    MalformedKeyword(#[from] KeywordError),

    #[error("capacity exceeded: {count} normalized records exceed the limit of {limit}")]
    CapacityExceeded { count: usize, limit: usize },

    #[error("strict mode: {0}")]
    Listing(#[from] ListingError),
}
