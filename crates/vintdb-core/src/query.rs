//! Search query phrases and the YAML file that lists them.
//!
//! A query phrase is a whitespace-separated keyword string with a fixed
//! layout: `brand qualifier category1 category2 [extra...]`, for example
//! `"リーバイス ヴィンテージ パンツ デニム"`. The same phrase is sent to the
//! search API verbatim and supplies the brand/category columns of every
//! record the run emits.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConfigError;

/// Minimum token count for a usable query phrase.
pub const MIN_KEYWORD_TOKENS: usize = 4;

/// Price floor used when a query does not set `min_price`.
pub const DEFAULT_MIN_PRICE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed query keyword \"{keyword}\": expected at least 4 whitespace-separated tokens, found {token_count}")]
pub struct KeywordError {
    pub keyword: String,
    pub token_count: usize,
}

/// A validated query phrase.
///
/// Splitting uses Unicode whitespace, so the ideographic space (U+3000)
/// common in Japanese input separates tokens just like an ASCII space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKeyword {
    phrase: String,
    tokens: Vec<String>,
}

impl QueryKeyword {
    /// Parses and validates a query phrase.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError`] when fewer than [`MIN_KEYWORD_TOKENS`] tokens
    /// are present.
    pub fn parse(phrase: &str) -> Result<Self, KeywordError> {
        let tokens: Vec<String> = phrase.split_whitespace().map(str::to_owned).collect();
        if tokens.len() < MIN_KEYWORD_TOKENS {
            return Err(KeywordError {
                keyword: phrase.to_owned(),
                token_count: tokens.len(),
            });
        }
        Ok(Self {
            phrase: phrase.trim().to_owned(),
            tokens,
        })
    }

    /// The phrase as sent to the search API.
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    #[must_use]
    pub fn brand(&self) -> &str {
        &self.tokens[0]
    }

    #[must_use]
    pub fn qualifier(&self) -> &str {
        &self.tokens[1]
    }

    #[must_use]
    pub fn category1(&self) -> &str {
        &self.tokens[2]
    }

    #[must_use]
    pub fn category2(&self) -> &str {
        &self.tokens[3]
    }

    /// File-name-safe stem identifying this query's output, e.g.
    /// `"リーバイス_パンツ_デニム"`.
    #[must_use]
    pub fn output_stem(&self) -> String {
        [self.brand(), self.category1(), self.category2()]
            .iter()
            .map(|t| {
                t.chars()
                    .map(|c| {
                        if matches!(c, '/' | '\\' | ':' | '\0') {
                            '-'
                        } else {
                            c
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl std::str::FromStr for QueryKeyword {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for QueryKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.phrase)
    }
}

/// One entry of the queries file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub keyword: String,
    /// Lower price bound passed to the search API, in yen.
    #[serde(default = "default_min_price")]
    pub min_price: u64,
}

impl QueryConfig {
    /// A query with the default price floor.
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            min_price: DEFAULT_MIN_PRICE,
        }
    }

    /// # Errors
    ///
    /// Returns [`KeywordError`] if `keyword` is malformed.
    pub fn parsed_keyword(&self) -> Result<QueryKeyword, KeywordError> {
        QueryKeyword::parse(&self.keyword)
    }
}

fn default_min_price() -> u64 {
    DEFAULT_MIN_PRICE
}

#[derive(Debug, Deserialize)]
pub struct QueriesFile {
    pub queries: Vec<QueryConfig>,
}

/// Load and validate the queries configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_queries(path: &Path) -> Result<QueriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::QueriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let queries_file: QueriesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::QueriesFileParse)?;

    validate_queries(&queries_file)?;

    Ok(queries_file)
}

fn validate_queries(queries_file: &QueriesFile) -> Result<(), ConfigError> {
    if queries_file.queries.is_empty() {
        return Err(ConfigError::Validation(
            "queries file must list at least one query".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for query in &queries_file.queries {
        let keyword = query.parsed_keyword()?;
        if !seen.insert(keyword.tokens.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate query keyword: '{}'",
                keyword.phrase()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
