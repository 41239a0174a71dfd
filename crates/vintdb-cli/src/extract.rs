//! `extract` command: runs the extractors on ad-hoc text for rule debugging.

use serde_json::json;
use vintdb_scraper::extract::{extract_attributes, AmbiguousAge};

/// Extraction result as the JSON object the command prints.
fn describe(name: &str, caption: &str) -> Result<serde_json::Value, AmbiguousAge> {
    let attrs = extract_attributes(name, caption)?;
    Ok(json!({
        "age": attrs.age,
        "model": attrs.model,
        "size": attrs.size.resolved(),
        "inches": attrs.size.inches,
        "centimeters": attrs.size.centimeters,
    }))
}

/// Prints the extracted attributes as pretty JSON.
///
/// # Errors
///
/// Returns an error if `name` mentions three or more distinct decades.
pub(crate) fn run_extract(name: &str, caption: &str) -> anyhow::Result<()> {
    let value = describe(name, caption)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
