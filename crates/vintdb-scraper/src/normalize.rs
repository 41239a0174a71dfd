//! Normalization from raw search API listings to [`vintdb_core::CanonicalRecord`].
//!
//! Attribute extraction is delegated to [`crate::extract`] and happens in a
//! later pipeline stage; this module focuses on structural conversion and
//! the image URL rewrite applied to filtered records.

use chrono::NaiveDate;
use vintdb_core::{CanonicalRecord, ImageSlots, QueryKeyword};

use crate::types::RawListing;

/// Normalizes a [`RawListing`] into a [`CanonicalRecord`].
///
/// Text fields, price and affiliate URL are carried over verbatim. Image
/// URLs are both slotted into three columns and kept whole as a JSON array
/// string, in original order. Brand and categories come from `keyword`, not
/// from the listing. Age, model and size are left empty for the enrichment
/// stage.
#[must_use]
pub fn normalize_listing(
    raw: RawListing,
    run_date: NaiveDate,
    keyword: &QueryKeyword,
) -> CanonicalRecord {
    let image_slots = ImageSlots::from_urls(&raw.medium_image_urls);
    let medium_image_urls = serialize_image_urls(raw.medium_image_urls);

    CanonicalRecord {
        run_date,
        item_code: raw.item_code,
        item_name: raw.item_name,
        item_caption: raw.item_caption,
        item_price: raw.item_price,
        affiliate_url: raw.affiliate_url,
        medium_image_urls,
        image_slots,
        brand: keyword.brand().to_owned(),
        item_category_1: keyword.category1().to_owned(),
        item_category_2: keyword.category2().to_owned(),
        age: None,
        model: None,
        size: None,
    }
}

/// Thumbnail size parameter the search API puts on image URLs.
pub const THUMBNAIL_SIZE_PARAM: &str = "_ex=128x128";
/// Size parameter requested for ready records.
pub const FULL_SIZE_PARAM: &str = "_ex=400x400";

/// Rewrites every image URL on `record` from the 128x128 thumbnail to the
/// 400x400 rendition, in the three slots and the serialized list alike.
///
/// URLs without the thumbnail parameter are left untouched.
#[must_use]
pub fn upscale_image_urls(record: CanonicalRecord) -> CanonicalRecord {
    let upscale = |url: String| url.replace(THUMBNAIL_SIZE_PARAM, FULL_SIZE_PARAM);
    let ImageSlots {
        medium_image_url_1,
        medium_image_url_2,
        medium_image_url_3,
    } = record.image_slots;
    CanonicalRecord {
        medium_image_urls: record
            .medium_image_urls
            .replace(THUMBNAIL_SIZE_PARAM, FULL_SIZE_PARAM),
        image_slots: ImageSlots {
            medium_image_url_1: medium_image_url_1.map(upscale),
            medium_image_url_2: medium_image_url_2.map(upscale),
            medium_image_url_3: medium_image_url_3.map(upscale),
        },
        ..record
    }
}

/// Serializes image URLs as a compact JSON array, e.g. `["a","b"]`.
fn serialize_image_urls(urls: Vec<String>) -> String {
    serde_json::Value::from(urls).to_string()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
