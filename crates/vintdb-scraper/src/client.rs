//! HTTP client for the Rakuten Ichiba item search API.

use std::time::Duration;

use reqwest::{Client, Url};
use vintdb_core::QueryConfig;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{ApiErrorBody, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://app.rakuten.co.jp/services/api/IchibaItem/Search/20170706";

/// Listings requested per page; the API maximum.
pub const HITS_PER_PAGE: u32 = 30;

/// Highest page number the API serves. Together with [`HITS_PER_PAGE`] this
/// bounds one query to 3000 listings.
pub const MAX_PAGES: u32 = 100;

/// Client for the item search endpoint.
///
/// Results are always requested as `formatVersion=2`, sorted by descending
/// price. Transient failures are retried with exponential backoff (see
/// [`crate::rate_limit`]).
pub struct RakutenClient {
    client: Client,
    base_url: Url,
    application_id: String,
    affiliate_id: Option<String>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl std::fmt::Debug for RakutenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RakutenClient")
            .field("base_url", &self.base_url.as_str())
            .field("application_id", &"[redacted]")
            .field("affiliate_id", &self.affiliate_id.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .finish_non_exhaustive()
    }
}

impl RakutenClient {
    /// Creates a client pointed at the production search endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        application_id: &str,
        affiliate_id: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(
            application_id,
            affiliate_id,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_secs,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom endpoint URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`ScraperError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        application_id: &str,
        affiliate_id: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let parsed = Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            application_id: application_id.to_owned(),
            affiliate_id: affiliate_id.map(str::to_owned),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of search results, retrying transient errors.
    ///
    /// The returned [`SearchResponse`] carries the page's raw `Items` and
    /// the API-reported `pageCount`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] on HTTP 429 after retries are exhausted.
    /// - [`ScraperError::UnexpectedStatus`] on 5xx after retries, or on a
    ///   non-2xx whose body is not an API error object.
    /// - [`ScraperError::Api`] on a non-2xx carrying `error` /
    ///   `error_description` (not retried).
    /// - [`ScraperError::Http`] on network failure after retries.
    /// - [`ScraperError::Deserialize`] if a 2xx body is not a search response.
    pub async fn fetch_page(
        &self,
        query: &QueryConfig,
        page: u32,
    ) -> Result<SearchResponse, ScraperError> {
        let url = self.search_url(&query.keyword, query.min_price, page);
        // Error values carry the endpoint without its query string so the
        // application id never reaches logs.
        let endpoint = self.base_url.as_str().to_owned();

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let endpoint = endpoint.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(1);
                    return Err(ScraperError::RateLimited { retry_after_secs });
                }

                if status.is_server_error() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: endpoint,
                    });
                }

                let body = response.text().await?;

                if !status.is_success() {
                    return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                        Ok(api) => ScraperError::Api {
                            status: status.as_u16(),
                            error: api.error,
                            description: api.error_description,
                        },
                        Err(_) => ScraperError::UnexpectedStatus {
                            status: status.as_u16(),
                            url: endpoint,
                        },
                    });
                }

                serde_json::from_str::<SearchResponse>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("search page {page}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Fetches every page for `query`, up to the reported `pageCount` or
    /// [`MAX_PAGES`], whichever is lower. Items keep the API's order.
    ///
    /// `inter_request_delay_ms` is slept between page requests.
    ///
    /// All-or-nothing: if any page fails, the items already fetched are
    /// discarded and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`].
    pub async fn fetch_all(
        &self,
        query: &QueryConfig,
        inter_request_delay_ms: u64,
    ) -> Result<Vec<serde_json::Value>, ScraperError> {
        let mut items = Vec::new();
        let mut page = 1u32;
        let mut last_page = 1u32;

        while page <= last_page {
            if page > 1 && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }

            let response = self.fetch_page(query, page).await?;
            if page == 1 {
                last_page = response.page_count.clamp(1, MAX_PAGES);
            }
            tracing::debug!(
                keyword = %query.keyword,
                page,
                last_page,
                page_items = response.items.len(),
                total_hits = response.count,
                "fetched search page"
            );

            if response.items.is_empty() {
                break;
            }
            items.extend(response.items);
            page += 1;
        }

        Ok(items)
    }

    /// Builds the request URL for one page of `keyword` results.
    pub(crate) fn search_url(&self, keyword: &str, min_price: u64, page: u32) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("applicationId", &self.application_id)
                .append_pair("format", "json")
                .append_pair("formatVersion", "2")
                .append_pair("sort", "-itemPrice")
                .append_pair("minPrice", &min_price.to_string())
                .append_pair("keyword", keyword)
                .append_pair("hits", &HITS_PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            if let Some(affiliate_id) = &self.affiliate_id {
                pairs.append_pair("affiliateId", affiliate_id);
            }
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
