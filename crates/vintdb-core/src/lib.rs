pub mod app_config;
pub mod config;
pub mod listings;
pub mod query;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use listings::{Age, CanonicalRecord, ImageSlots, ModelVariant};
pub use query::{
    load_queries, KeywordError, QueriesFile, QueryConfig, QueryKeyword, DEFAULT_MIN_PRICE,
};

use thiserror::Error;

/// Hard upper bound on records per run. The search API serves at most 100
/// pages of 30 hits, so a run can never legitimately exceed this.
pub const MAX_RECORDS_PER_RUN: usize = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read queries file {path}: {source}")]
    QueriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse queries file: {0}")]
    QueriesFileParse(#[source] serde_yaml::Error),

    #[error(transparent)]
    Keyword(#[from] KeywordError),

    #[error("queries file validation failed: {0}")]
    Validation(String),
}
