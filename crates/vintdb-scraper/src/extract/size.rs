use std::sync::LazyLock;

use regex::Regex;

use super::parse_digits;

const CM_PER_INCH: f64 = 2.54;

/// Inch notation: a waist marker directly followed by 20–49.
///
/// Markers are `W`/`w` (ASCII or full-width), "実寸" (actual measurement)
/// and "サイズ" (size).
static INCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[wWｗＷ]|実寸|サイズ)(?P<inches>[2-4２-４][0-9０-９])")
        .expect("valid inch regex")
});

/// Centimeter notation: "ウエスト", at most one separator character ("約",
/// ":", "：", a space...), 70–99, then "cm" in ASCII or full width.
static CM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ウエスト.?(?P<cm>[7-9７-９][0-9０-９])(?:cm|ｃｍ)").expect("valid cm regex")
});

/// Both waist readings found in a caption, before reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeExtraction {
    /// First inch-notation value in caption order.
    pub inches: Option<u8>,
    /// First centimeter-notation value, unconverted.
    pub centimeters: Option<u8>,
}

impl SizeExtraction {
    /// The centimeter reading converted to whole inches.
    #[must_use]
    pub fn converted_inches(&self) -> Option<u8> {
        self.centimeters.map(cm_to_inches)
    }

    /// Inch notation when present, else the converted centimeter reading.
    /// The two are never averaged and a disagreement is not an error.
    #[must_use]
    pub fn resolved(&self) -> Option<u8> {
        self.inches.or_else(|| self.converted_inches())
    }
}

/// Converts whole centimeters to the nearest whole inch.
///
/// Rounds half away from zero. For the 70–99 cm inputs the regex admits,
/// `cm / 2.54` never lands exactly on a half, so this agrees with
/// round-half-to-even.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cm_to_inches(cm: u8) -> u8 {
    (f64::from(cm) / CM_PER_INCH).round() as u8
}

/// Finds both waist notations in `item_caption` without reconciling them.
#[must_use]
pub fn extract_size_detail(item_caption: &str) -> SizeExtraction {
    let capture = |re: &Regex, group: &str| {
        re.captures(item_caption)
            .and_then(|caps| parse_digits(&caps[group]))
            .and_then(|v| u8::try_from(v).ok())
    };
    SizeExtraction {
        inches: capture(&INCH_RE, "inches"),
        centimeters: capture(&CM_RE, "cm"),
    }
}

/// Derives a waist size in inches from a listing caption.
///
/// Inch notation ("W32", "実寸33", "サイズ31") wins over centimeter notation
/// ("ウエスト81cm" → 32); `None` when neither appears.
#[must_use]
pub fn extract_size(item_caption: &str) -> Option<u8> {
    extract_size_detail(item_caption).resolved()
}
