//! Rule-based attribute extraction from listing text.
//!
//! Each extractor is a pure function of one text field. Nothing here
//! allocates shared state, so callers may run them in any order or in
//! parallel; results only depend on the input string.

mod age;
mod model;
mod size;

pub use age::{extract_age, AmbiguousAge, EXCLUDED_DECADE};
pub use model::{extract_model, ModelPattern, ModelRule, MODEL_RULES};
pub use size::{cm_to_inches, extract_size, extract_size_detail, SizeExtraction};

use vintdb_core::{Age, ModelVariant};

/// The three derived attributes of one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedAttributes {
    pub age: Option<Age>,
    pub model: Option<ModelVariant>,
    pub size: SizeExtraction,
}

/// Runs all three extractors: age and model read the listing name, size
/// reads the caption.
///
/// # Errors
///
/// Returns [`AmbiguousAge`] if the name mentions three or more distinct
/// decades.
pub fn extract_attributes(
    item_name: &str,
    item_caption: &str,
) -> Result<ExtractedAttributes, AmbiguousAge> {
    Ok(ExtractedAttributes {
        age: extract_age(item_name)?,
        model: extract_model(item_name),
        size: extract_size_detail(item_caption),
    })
}

/// Parses a run of ASCII or full-width (U+FF10..U+FF19) decimal digits.
///
/// Listing text mixes both forms freely ("W32" next to "Ｗ３２"), and the
/// regexes accept either, so conversion has to as well.
pub(crate) fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    s.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '０'..='９' => c as u32 - '０' as u32,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}
