//! NDJSON load sink.
//!
//! One file per query, run date and layer:
//!
//! - ready: `{output_dir}/{run_date}/{brand}_{category1}_{category2}.ndjson`
//! - raw: `{output_dir}/{run_date}/raw/{brand}_{category1}_{category2}.ndjson`
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! reader never observes a partial file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use vintdb_core::CanonicalRecord;

/// Which stage of a query's records a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layer {
    /// Every normalized record, before the category filter.
    Raw,
    /// Filtered and enriched records.
    Ready,
}

impl Layer {
    fn subdir(self) -> Option<&'static str> {
        match self {
            Layer::Raw => Some("raw"),
            Layer::Ready => None,
        }
    }
}

/// Final location of a query's output file for `layer`.
pub(crate) fn output_path(
    output_dir: &Path,
    run_date: NaiveDate,
    layer: Layer,
    stem: &str,
) -> PathBuf {
    let mut dir = output_dir.join(run_date.format("%Y-%m-%d").to_string());
    if let Some(subdir) = layer.subdir() {
        dir.push(subdir);
    }
    dir.join(format!("{stem}.ndjson"))
}

/// Writes `records` as newline-delimited JSON, replacing any earlier file
/// for the same query, date and layer.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written or renamed. The temporary file is removed on failure.
pub(crate) fn write_ndjson(
    output_dir: &Path,
    run_date: NaiveDate,
    layer: Layer,
    stem: &str,
    records: &[CanonicalRecord],
) -> anyhow::Result<PathBuf> {
    let path = output_path(output_dir, run_date, layer, stem);
    let dir = path
        .parent()
        .context("output path has no parent directory")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let tmp = dir.join(format!(".{stem}.{}.tmp", uuid::Uuid::new_v4()));
    if let Err(e) = write_records(&tmp, records) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(e)
            .with_context(|| format!("failed to move output into place at {}", path.display()));
    }

    tracing::debug!(
        path = %path.display(),
        layer = ?layer,
        records = records.len(),
        "wrote ndjson output"
    );
    Ok(path)
}

fn write_records(tmp: &Path, records: &[CanonicalRecord]) -> anyhow::Result<()> {
    let file = File::create(tmp)
        .with_context(|| format!("failed to create temporary file {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)
            .with_context(|| format!("failed to serialize record {}", record.item_code))?;
        writer.write_all(b"\n")?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}
