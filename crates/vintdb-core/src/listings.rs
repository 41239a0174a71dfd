use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Product era derived from a listing name.
///
/// Decades are the two-digit values as written in the listing (`60` for
/// "60年代" or "60s"). A range means "somewhere between these two eras", not
/// every decade in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Decade(u8),
    /// Invariant: `min < max`.
    Range { min: u8, max: u8 },
}

impl Age {
    /// Builds a range, ordering the bounds. Equal bounds collapse to a
    /// single decade.
    #[must_use]
    pub fn between(a: u8, b: u8) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Age::Range { min: a, max: b },
            std::cmp::Ordering::Greater => Age::Range { min: b, max: a },
            std::cmp::Ordering::Equal => Age::Decade(a),
        }
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Age::Decade(d) => write!(f, "{d}"),
            Age::Range { min, max } => write!(f, "{min}~{max}"),
        }
    }
}

impl std::str::FromStr for Age {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<u8>()
                .map_err(|e| format!("invalid decade '{v}': {e}"))
        };
        match s.split_once('~') {
            Some((lo, hi)) => {
                let (min, max) = (parse(lo)?, parse(hi)?);
                if min >= max {
                    return Err(format!("age range '{s}' must have min < max"));
                }
                Ok(Age::Range { min, max })
            }
            None => parse(s).map(Age::Decade),
        }
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Age {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Historical product design a listing refers to.
///
/// Serialized with the catalog's display labels so stored values stay
/// readable by the analytics side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    #[serde(rename = "大戦モデル")]
    Wartime,
    #[serde(rename = "XX")]
    Xx,
    #[serde(rename = "Big E")]
    BigE,
    #[serde(rename = "66前期")]
    SixtySixEarly,
    #[serde(rename = "66後期")]
    SixtySixLate,
    #[serde(rename = "赤耳")]
    RedSelvedge,
}

impl ModelVariant {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ModelVariant::Wartime => "大戦モデル",
            ModelVariant::Xx => "XX",
            ModelVariant::BigE => "Big E",
            ModelVariant::SixtySixEarly => "66前期",
            ModelVariant::SixtySixLate => "66後期",
            ModelVariant::RedSelvedge => "赤耳",
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The first three image URLs of a listing, one column each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSlots {
    pub medium_image_url_1: Option<String>,
    pub medium_image_url_2: Option<String>,
    pub medium_image_url_3: Option<String>,
}

impl ImageSlots {
    /// Fills slots in order from `urls`; anything past the third URL is not
    /// slotted (it is still kept in the serialized list on the record).
    #[must_use]
    pub fn from_urls(urls: &[String]) -> Self {
        let mut iter = urls.iter().cloned();
        Self {
            medium_image_url_1: iter.next(),
            medium_image_url_2: iter.next(),
            medium_image_url_3: iter.next(),
        }
    }

    /// Number of filled slots.
    #[must_use]
    pub fn len(&self) -> usize {
        [
            &self.medium_image_url_1,
            &self.medium_image_url_2,
            &self.medium_image_url_3,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One listing in warehouse shape: the stable output contract of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Run date shared by every record of a run; storage partitions on it.
    pub run_date: NaiveDate,
    pub item_code: String,
    pub item_name: String,
    pub item_caption: String,
    /// Price in yen.
    pub item_price: u64,
    pub affiliate_url: String,
    /// JSON array of every image URL in original order, e.g.
    /// `["https://…/a.jpg?_ex=128x128","https://…/b.jpg?_ex=128x128"]`.
    pub medium_image_urls: String,
    #[serde(flatten)]
    pub image_slots: ImageSlots,
    pub brand: String,
    pub item_category_1: String,
    pub item_category_2: String,
    pub age: Option<Age>,
    pub model: Option<ModelVariant>,
    /// Waist size in inches.
    pub size: Option<u8>,
}

impl CanonicalRecord {
    /// Decodes [`Self::medium_image_urls`] back into the ordered URL list.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the stored value is not a string array.
    pub fn image_urls(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.medium_image_urls)
    }
}
