use vintdb_core::ModelVariant;

/// How a model rule recognizes its variant in a listing name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPattern {
    /// Case-sensitive substring.
    Literal(&'static str),
    /// Any of several case-sensitive substrings.
    AnyOf(&'static [&'static str]),
}

impl ModelPattern {
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            ModelPattern::Literal(needle) => text.contains(needle),
            ModelPattern::AnyOf(needles) => needles.iter().any(|n| text.contains(n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRule {
    pub pattern: ModelPattern,
    pub variant: ModelVariant,
}

/// Model rules in precedence order; the first matching rule wins, so a
/// name mentioning both "XX" and "赤耳" is classified as XX.
pub const MODEL_RULES: &[ModelRule] = &[
    ModelRule {
        pattern: ModelPattern::Literal("大戦モデル"),
        variant: ModelVariant::Wartime,
    },
    ModelRule {
        pattern: ModelPattern::Literal("XX"),
        variant: ModelVariant::Xx,
    },
    ModelRule {
        pattern: ModelPattern::AnyOf(&["ビッグE", "ビッグ E", "BigE", "Big E", "BIGE", "BIG E"]),
        variant: ModelVariant::BigE,
    },
    ModelRule {
        pattern: ModelPattern::Literal("66前期"),
        variant: ModelVariant::SixtySixEarly,
    },
    ModelRule {
        pattern: ModelPattern::Literal("66後期"),
        variant: ModelVariant::SixtySixLate,
    },
    ModelRule {
        pattern: ModelPattern::Literal("赤耳"),
        variant: ModelVariant::RedSelvedge,
    },
];

/// Returns the variant of the first rule in [`MODEL_RULES`] that matches
/// `item_name`, or `None` if no rule matches.
#[must_use]
pub fn extract_model(item_name: &str) -> Option<ModelVariant> {
    MODEL_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(item_name))
        .map(|rule| rule.variant)
}
