//! Listing pipeline orchestration.
//!
//! Stages, each a batch transform that emits the same or fewer records:
//!
//! 1. **Fetched**: raw `Items` JSON is decoded into [`RawListing`]s.
//! 2. **Normalized**: listings become [`CanonicalRecord`]s; duplicate item
//!    codes are dropped and the capacity cap is enforced.
//! 3. **Filtered**: records whose name lacks the query's first category
//!    are dropped, and image URLs are rewritten to the 400x400 rendition.
//!    The unfiltered normalized set is kept aside as the raw layer.
//! 4. **Enriched**: age, model and size are extracted.
//! 5. **Ready**: records are returned in fetch order with diagnostics.
//!
//! Nothing is retried here; fetch retries belong to [`crate::RakutenClient`].

use std::collections::HashSet;

use chrono::NaiveDate;
use vintdb_core::{CanonicalRecord, QueryKeyword, MAX_RECORDS_PER_RUN};

use crate::diagnostics::ExtractionDiagnostics;
use crate::error::{ListingError, PipelineError};
use crate::extract::{extract_attributes, ExtractedAttributes};
use crate::filter::filter_by_category;
use crate::normalize::{normalize_listing, upscale_image_urls};
use crate::types::RawListing;

/// Run-level policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Normalized record count above which the run aborts.
    pub max_records: usize,
    /// Promote per-listing errors to fatal [`PipelineError::Listing`].
    pub strict: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_records: MAX_RECORDS_PER_RUN,
            strict: false,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Ready records, in fetch order.
    pub records: Vec<CanonicalRecord>,
    /// Every normalized record before the category filter, with the
    /// original thumbnail image URLs.
    pub raw_records: Vec<CanonicalRecord>,
    pub diagnostics: ExtractionDiagnostics,
    /// Listings dropped for schema or ambiguity problems.
    pub skipped: Vec<ListingError>,
    pub stats: StageCounts,
}

/// Record counts after each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub fetched: usize,
    pub decoded: usize,
    pub duplicates: usize,
    pub normalized: usize,
    pub filtered: usize,
    pub ready: usize,
    /// Ready records with no image slot filled.
    pub ready_without_images: usize,
}

/// Runs every stage over one query's fetched items.
///
/// `keyword` is the query phrase the items were fetched with; it supplies
/// the brand and category columns and the category filter.
///
/// # Errors
///
/// - [`PipelineError::MalformedKeyword`] if `keyword` has fewer than four
///   tokens; checked before any item is touched.
/// - [`PipelineError::CapacityExceeded`] if more than
///   `options.max_records` unique records survive normalization.
/// - [`PipelineError::Listing`] in strict mode, for the first listing that
///   fails decoding or has an ambiguous age.
pub fn run_pipeline(
    items: Vec<serde_json::Value>,
    keyword: &str,
    run_date: NaiveDate,
    options: &PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let keyword = QueryKeyword::parse(keyword)?;
    let mut skipped = Vec::new();
    let mut stats = StageCounts {
        fetched: items.len(),
        ..StageCounts::default()
    };

    // Stage 1: decode.
    let raw = decode_listings(items, options, &mut skipped)?;
    stats.decoded = raw.len();

    // Stage 2: normalize, dedupe, cap.
    let (normalized, duplicates) = normalize_unique(raw, run_date, &keyword);
    stats.duplicates = duplicates;
    stats.normalized = normalized.len();
    if normalized.len() > options.max_records {
        return Err(PipelineError::CapacityExceeded {
            count: normalized.len(),
            limit: options.max_records,
        });
    }

    // Stage 3: category filter and image rewrite.
    let raw_records = normalized.clone();
    let filtered: Vec<CanonicalRecord> = filter_by_category(normalized, keyword.category1())
        .into_iter()
        .map(upscale_image_urls)
        .collect();
    stats.filtered = filtered.len();

    // Stage 4: enrich.
    let (records, attrs) = enrich_records(filtered, options, &mut skipped)?;
    stats.ready = records.len();
    stats.ready_without_images = records
        .iter()
        .filter(|r| r.image_slots.is_empty())
        .count();

    // Stage 5: diagnostics.
    let diagnostics = ExtractionDiagnostics::from_attributes(&attrs);

    tracing::info!(
        keyword = keyword.phrase(),
        fetched = stats.fetched,
        decoded = stats.decoded,
        duplicates = stats.duplicates,
        filtered = stats.filtered,
        ready = stats.ready,
        skipped = skipped.len(),
        without_images = stats.ready_without_images,
        age_none_rate = ?diagnostics.age_none_rate(),
        inch_none_rate = ?diagnostics.inch_none_rate(),
        size_none_rate = ?diagnostics.size_none_rate(),
        "pipeline run complete"
    );

    Ok(PipelineOutput {
        records,
        raw_records,
        diagnostics,
        skipped,
        stats,
    })
}

/// Skips `err` with a warning, or returns it when running strict.
fn skip_or_fail(
    err: ListingError,
    options: &PipelineOptions,
    skipped: &mut Vec<ListingError>,
) -> Result<(), PipelineError> {
    if options.strict {
        return Err(PipelineError::Listing(err));
    }
    tracing::warn!(kind = err.kind(), error = %err, "skipping listing");
    skipped.push(err);
    Ok(())
}

pub(crate) fn decode_listings(
    items: Vec<serde_json::Value>,
    options: &PipelineOptions,
    skipped: &mut Vec<ListingError>,
) -> Result<Vec<RawListing>, PipelineError> {
    let mut listings = Vec::with_capacity(items.len());
    for (index, value) in items.into_iter().enumerate() {
        match RawListing::from_value(index, value) {
            Ok(listing) => listings.push(listing),
            Err(err) => skip_or_fail(err, options, skipped)?,
        }
    }
    Ok(listings)
}

/// Normalizes listings, keeping the first record per item code.
///
/// Returns the records and the number of duplicates dropped.
pub(crate) fn normalize_unique(
    raw: Vec<RawListing>,
    run_date: NaiveDate,
    keyword: &QueryKeyword,
) -> (Vec<CanonicalRecord>, usize) {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut duplicates = 0usize;
    let records = raw
        .into_iter()
        .filter(|listing| {
            if seen.insert(listing.item_code.clone()) {
                true
            } else {
                duplicates += 1;
                tracing::warn!(item_code = %listing.item_code, "dropping duplicate listing");
                false
            }
        })
        .map(|listing| normalize_listing(listing, run_date, keyword))
        .collect();
    (records, duplicates)
}

pub(crate) fn enrich_records(
    records: Vec<CanonicalRecord>,
    options: &PipelineOptions,
    skipped: &mut Vec<ListingError>,
) -> Result<(Vec<CanonicalRecord>, Vec<ExtractedAttributes>), PipelineError> {
    let mut enriched = Vec::with_capacity(records.len());
    let mut all_attrs = Vec::with_capacity(records.len());

    for record in records {
        match extract_attributes(&record.item_name, &record.item_caption) {
            Ok(attrs) => {
                enriched.push(CanonicalRecord {
                    age: attrs.age,
                    model: attrs.model,
                    size: attrs.size.resolved(),
                    ..record
                });
                all_attrs.push(attrs);
            }
            Err(source) => {
                let err = ListingError::AmbiguousAge {
                    item_code: record.item_code,
                    source,
                };
                skip_or_fail(err, options, skipped)?;
            }
        }
    }

    Ok((enriched, all_attrs))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
