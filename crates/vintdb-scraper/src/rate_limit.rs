//! Retry with exponential backoff for the search API client.
//!
//! Transient failures (429, network errors, 5xx) are retried; anything the
//! API rejected on purpose is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a single backoff sleep.
const MAX_DELAY_SECS: u64 = 120;

/// Returns `true` if `err` is transient and worth another attempt.
///
/// Retriable: [`ScraperError::RateLimited`], [`ScraperError::Http`], and
/// [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else is returned immediately: a 4xx or API error body will
/// not change on retry, nor will a body that fails to deserialize.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::Api { .. }
        | ScraperError::Deserialize { .. }
        | ScraperError::InvalidBaseUrl { .. } => false,
    }
}

/// Backoff before retry number `attempt` (1-based), before jitter.
fn base_delay_secs(backoff_base_secs: u64, attempt: u32) -> u64 {
    backoff_base_secs
        .saturating_mul(1u64 << (attempt - 1).min(20))
        .min(MAX_DELAY_SECS)
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before retry *n* is `backoff_base_secs * 2^(n-1)` seconds,
/// capped at two minutes, with ±25 % jitter.
///
/// | Retry | Sleep (`backoff_base_secs = 5`) |
/// |-------|---------------------------------|
/// | 1     | 5 s ± 25 %                      |
/// | 2     | 10 s ± 25 %                     |
/// | 3     | 20 s ± 25 %                     |
///
/// With `max_retries = 3` the operation runs at most 4 times. When retries
/// are exhausted the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let base_ms = base_delay_secs(backoff_base_secs, attempt).saturating_mul(1000);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (base_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient search API error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> ScraperError {
        ScraperError::RateLimited {
            retry_after_secs: 0,
        }
    }

    fn status(status: u16) -> ScraperError {
        ScraperError::UnexpectedStatus {
            status,
            url: "https://app.example.test/search".to_owned(),
        }
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&status(500)));
        assert!(is_retriable(&status(503)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&status(404)));
        assert!(!is_retriable(&ScraperError::Api {
            status: 400,
            error: "wrong_parameter".to_owned(),
            description: "keyword is not valid".to_owned(),
        }));
    }

    #[test]
    fn base_delay_doubles_and_caps() {
        assert_eq!(base_delay_secs(5, 1), 5);
        assert_eq!(base_delay_secs(5, 2), 10);
        assert_eq!(base_delay_secs(5, 3), 20);
        assert_eq!(base_delay_secs(5, 10), MAX_DELAY_SECS);
        assert_eq!(base_delay_secs(0, 4), 0);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, ScraperError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_server_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(1, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(status(502))
                } else {
                    Ok::<&str, ScraperError>("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(rate_limited())
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                let e = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                Err::<u32, ScraperError>(ScraperError::Deserialize {
                    context: "test".to_owned(),
                    source: e,
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::Deserialize { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_client_error_status() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(status(403))
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 403, .. })
        ));
    }
}
