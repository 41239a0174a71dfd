//! Rakuten Ichiba item search API response types.
//!
//! ## Observed shape (`IchibaItem/Search/20170706`)
//!
//! ### `formatVersion`
//! With `formatVersion=2` the `Items` array holds item objects directly and
//! `mediumImageUrls` is an array of plain URL strings. With the legacy
//! `formatVersion=1` every entry is wrapped as `{"Item": {...}}` and image
//! URLs are objects like `{"imageUrl": "..."}`. We request version 2 but
//! accept both shapes so stored fixtures of either vintage decode.
//!
//! ### `mediumImageUrls`
//! 0–3 entries, 128x128 thumbnails (`?_ex=128x128`). Order is the shop's
//! gallery order and is preserved.
//!
//! ### `affiliateUrl`
//! Always present; an empty string when the request carried no
//! `affiliateId`.
//!
//! ### `itemPrice`
//! Integer yen. Never negative.
//!
//! ### Pagination
//! `page` is 1-based and `pageCount` is capped by the API at 100. `hits` is
//! the page size we asked for (max 30).

use serde::Deserialize;

use crate::error::ListingError;

/// Top-level response from the item search endpoint.
///
/// Items are kept as raw JSON so that one malformed listing is reported on
/// its own instead of failing the whole page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Total hits across all pages.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub hits: u32,
    #[serde(rename = "Items", default)]
    pub items: Vec<serde_json::Value>,
}

/// Error body returned with non-2xx responses, e.g.
/// `{"error": "wrong_parameter", "error_description": "keyword is not valid"}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

/// One listing as the search API returns it. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    /// Shop-scoped item code, e.g. `"vintage-shop:10001234"`.
    pub item_code: String,
    pub item_name: String,
    pub item_price: u64,
    pub item_caption: String,
    pub affiliate_url: String,
    #[serde(deserialize_with = "deserialize_image_urls")]
    pub medium_image_urls: Vec<String>,
}

impl RawListing {
    /// Decodes one `Items` entry. `index` is the entry's position in the
    /// fetched sequence and only feeds error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::SchemaMismatch`] if a required field is
    /// missing or has the wrong type.
    pub fn from_value(index: usize, value: serde_json::Value) -> Result<Self, ListingError> {
        // formatVersion=1 wraps each entry in {"Item": {...}}.
        let value = match value {
            serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("Item") => {
                map.remove("Item").unwrap_or(serde_json::Value::Null)
            }
            other => other,
        };

        let item_code = value
            .get("itemCode")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        serde_json::from_value(value).map_err(|e| ListingError::SchemaMismatch {
            index,
            item_code,
            reason: e.to_string(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageUrlEntry {
    Plain(String),
    Wrapped {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

fn deserialize_image_urls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entries = Vec::<ImageUrlEntry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            ImageUrlEntry::Plain(url) | ImageUrlEntry::Wrapped { image_url: url } => url,
        })
        .collect())
}
