//! `collect` command handler.
//!
//! Each query is an independent run: the record cap and item code
//! uniqueness apply to that query's output files, and only the run date is
//! shared across the invocation. The same listing may therefore appear in
//! the files of two overlapping queries.
//!
//! Per-query failures are logged and counted rather than propagated, so one
//! bad query does not stop the others. The command fails at the end if any
//! query failed.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use vintdb_core::{AppConfig, QueryConfig, QueryKeyword};
use vintdb_scraper::{run_pipeline, PipelineOptions, RakutenClient};

use crate::sink::{self, Layer};

/// Outcome of one successfully collected query.
#[derive(Debug)]
pub(crate) struct QueryOutcome {
    pub(crate) path: PathBuf,
    pub(crate) raw_path: PathBuf,
    pub(crate) records: usize,
    pub(crate) raw_records: usize,
    pub(crate) skipped: usize,
}

/// Totals across every query of one `collect` invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CollectSummary {
    pub(crate) queries: usize,
    pub(crate) records: usize,
    pub(crate) failed: usize,
}

pub(crate) fn build_rakuten_client(config: &AppConfig) -> anyhow::Result<RakutenClient> {
    RakutenClient::new(
        &config.rakuten_application_id,
        config.rakuten_affiliate_id.as_deref(),
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build search API client: {e}"))
}

/// Resolves the queries for this run: the single `--query` phrase when
/// given, otherwise the queries file.
///
/// # Errors
///
/// Returns an error if the phrase is malformed or the queries file cannot
/// be loaded.
pub(crate) fn resolve_queries(
    config: &AppConfig,
    query_filter: Option<&str>,
) -> anyhow::Result<Vec<QueryConfig>> {
    if let Some(phrase) = query_filter {
        QueryKeyword::parse(phrase)?;
        return Ok(vec![QueryConfig::new(phrase)]);
    }

    let file = vintdb_core::load_queries(&config.queries_path).with_context(|| {
        format!(
            "failed to load queries from {}",
            config.queries_path.display()
        )
    })?;
    Ok(file.queries)
}

/// Runs every resolved query through fetch, pipeline and sink.
///
/// With `dry_run` the queries are printed and nothing is fetched. `strict`
/// is OR-ed with the configured strict mode.
///
/// # Errors
///
/// Returns an error if the queries cannot be resolved, the client cannot
/// be built, or any query failed.
pub(crate) async fn run_collect(
    config: &AppConfig,
    query_filter: Option<&str>,
    dry_run: bool,
    strict: bool,
) -> anyhow::Result<()> {
    let queries = resolve_queries(config, query_filter)?;

    if dry_run {
        let phrases: Vec<&str> = queries.iter().map(|q| q.keyword.as_str()).collect();
        println!(
            "dry-run: would collect {} queries: [{}]",
            queries.len(),
            phrases.join(", ")
        );
        return Ok(());
    }

    let client = build_rakuten_client(config)?;
    let run_date = chrono::Local::now().date_naive();
    let options = PipelineOptions {
        max_records: config.max_records,
        strict: strict || config.strict,
    };

    let summary = collect_all(&client, config, &queries, run_date, &options).await;

    if summary.failed > 0 {
        anyhow::bail!("{} of {} queries failed", summary.failed, summary.queries);
    }

    println!(
        "collected {} records across {} queries",
        summary.records, summary.queries
    );
    Ok(())
}

/// Runs `queries` in order under one run date, logging and counting
/// failures instead of stopping at the first.
pub(crate) async fn collect_all(
    client: &RakutenClient,
    config: &AppConfig,
    queries: &[QueryConfig],
    run_date: NaiveDate,
    options: &PipelineOptions,
) -> CollectSummary {
    let mut summary = CollectSummary {
        queries: queries.len(),
        ..CollectSummary::default()
    };

    for query in queries {
        match collect_query(client, config, query, run_date, options).await {
            Ok(outcome) => {
                tracing::info!(
                    keyword = %query.keyword,
                    records = outcome.records,
                    raw_records = outcome.raw_records,
                    skipped = outcome.skipped,
                    path = %outcome.path.display(),
                    raw_path = %outcome.raw_path.display(),
                    "query collected"
                );
                summary.records += outcome.records;
            }
            Err(e) => {
                tracing::error!(keyword = %query.keyword, error = %format!("{e:#}"), "query failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Fetches, processes and stores one query: the raw layer first, then the
/// ready records. Nothing is written unless the whole pipeline succeeds.
pub(crate) async fn collect_query(
    client: &RakutenClient,
    config: &AppConfig,
    query: &QueryConfig,
    run_date: NaiveDate,
    options: &PipelineOptions,
) -> anyhow::Result<QueryOutcome> {
    let keyword = query.parsed_keyword()?;

    let items = client
        .fetch_all(query, config.scraper_inter_request_delay_ms)
        .await
        .context("search API fetch failed")?;

    let output = run_pipeline(items, &query.keyword, run_date, options)?;

    let stem = keyword.output_stem();
    let raw_path = sink::write_ndjson(
        &config.output_dir,
        run_date,
        Layer::Raw,
        &stem,
        &output.raw_records,
    )?;
    let path = sink::write_ndjson(
        &config.output_dir,
        run_date,
        Layer::Ready,
        &stem,
        &output.records,
    )?;

    Ok(QueryOutcome {
        path,
        raw_path,
        records: output.records.len(),
        raw_records: output.raw_records.len(),
        skipped: output.skipped.len(),
    })
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
