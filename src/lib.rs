pub mod analysis;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod report;

pub use analysis::{summarize, PriceStats};
pub use error::{DetailError, DetailParseError, FetchError, ParseError, SearchError};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use models::{DetailSummary, EnrichedRecord, ListingRecord, PriceHistory, Recommendation};
pub use parsers::{extract_listings, extract_price_history, Document};
pub use pipeline::{SearchOutcome, SearchPipeline};
