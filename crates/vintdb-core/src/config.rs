use crate::app_config::AppConfig;
use crate::{ConfigError, MAX_RECORDS_PER_RUN};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let rakuten_application_id = require("RAKUTEN_APPLICATION_ID")?;
    let rakuten_affiliate_id = lookup("RAKUTEN_AFFILIATE_ID")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let log_level = or_default("VINTDB_LOG_LEVEL", "info");
    let queries_path = PathBuf::from(or_default("VINTDB_QUERIES_PATH", "./config/queries.yaml"));
    let output_dir = PathBuf::from(or_default("VINTDB_OUTPUT_DIR", "./data"));

    let scraper_request_timeout_secs = parse_u64("VINTDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "VINTDB_SCRAPER_USER_AGENT",
        "vintdb/0.1 (catalog-intelligence)",
    );
    let scraper_inter_request_delay_ms =
        parse_u64("VINTDB_SCRAPER_INTER_REQUEST_DELAY_MS", "1000")?;
    let scraper_max_retries = parse_u32("VINTDB_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("VINTDB_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let max_records = parse_usize("VINTDB_MAX_RECORDS", "3000")?;
    if max_records == 0 || max_records > MAX_RECORDS_PER_RUN {
        return Err(invalid(
            "VINTDB_MAX_RECORDS",
            format!("must be between 1 and {MAX_RECORDS_PER_RUN}, got {max_records}"),
        ));
    }

    let strict = parse_bool(&or_default("VINTDB_STRICT", "false"))
        .ok_or_else(|| invalid("VINTDB_STRICT", "expected true/false or 1/0".to_string()))?;

    Ok(AppConfig {
        log_level,
        queries_path,
        output_dir,
        rakuten_application_id,
        rakuten_affiliate_id,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        max_records,
        strict,
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
