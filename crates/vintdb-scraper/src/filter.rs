use vintdb_core::CanonicalRecord;

/// Keeps records whose `item_name` contains `category1` as a plain
/// substring, in their original order.
///
/// Containment is not word-aware: a category of "パンツ" also keeps
/// "ショートパンツ" listings.
#[must_use]
pub fn filter_by_category(records: Vec<CanonicalRecord>, category1: &str) -> Vec<CanonicalRecord> {
    records
        .into_iter()
        .filter(|r| r.item_name.contains(category1))
        .collect()
}
