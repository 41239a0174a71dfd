use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub queries_path: PathBuf,
    pub output_dir: PathBuf,
    pub rakuten_application_id: String,
    pub rakuten_affiliate_id: Option<String>,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    /// Capacity cap checked right after normalization; never above
    /// [`crate::MAX_RECORDS_PER_RUN`].
    pub max_records: usize,
    /// When set, per-listing errors (schema mismatch, ambiguous age) abort
    /// the run instead of being skipped.
    pub strict: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("queries_path", &self.queries_path)
            .field("output_dir", &self.output_dir)
            .field("rakuten_application_id", &"[redacted]")
            .field(
                "rakuten_affiliate_id",
                &self.rakuten_affiliate_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("max_records", &self.max_records)
            .field("strict", &self.strict)
            .finish()
    }
}
