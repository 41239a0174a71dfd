pub mod client;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub(crate) mod rate_limit;
pub mod types;

pub use client::{RakutenClient, HITS_PER_PAGE, MAX_PAGES};
pub use diagnostics::ExtractionDiagnostics;
pub use error::{ListingError, PipelineError, ScraperError};
pub use extract::{extract_attributes, ExtractedAttributes};
pub use filter::filter_by_category;
pub use normalize::{normalize_listing, upscale_image_urls};
pub use pipeline::{run_pipeline, PipelineOptions, PipelineOutput, StageCounts};
pub use types::{RawListing, SearchResponse};
