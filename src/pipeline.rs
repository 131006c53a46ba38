use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::summarize;
use crate::config::Config;
use crate::error::{DetailError, SearchError};
use crate::fetcher::PageFetcher;
use crate::models::{display_or_na, DetailSummary, EnrichedRecord, ListingRecord};
use crate::parsers::{extract_listings, extract_price_history, Document};

/// Result of one search. An empty `records` means the page had no listings.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub search_url: String,
    pub records: Vec<EnrichedRecord>,
}

pub struct SearchPipeline<F> {
    fetcher: F,
    config: Arc<Config>,
}

impl<F: PageFetcher> SearchPipeline<F> {
    pub fn new(fetcher: F, config: Arc<Config>) -> Self {
        Self { fetcher, config }
    }

    /// Fetch the search page for `query` and enrich every listing on it.
    ///
    /// Only a failure to obtain or decode the search page itself is an error.
    /// Dropping the returned future abandons any detail fetches in flight.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let search_url = self.config.search_url(query)?;
        info!("Fetching the search results page: {}", search_url);

        let raw = self
            .fetcher
            .fetch(search_url.as_str())
            .await
            .map_err(SearchError::Fetch)?;

        let listings = {
            let doc = Document::parse(&raw).map_err(SearchError::Parse)?;
            extract_listings(&doc, &self.config.origin)
        };
        info!("Parsed {} listings for '{}'", listings.len(), query);

        let records = self.enrich_all(listings).await;

        Ok(SearchOutcome {
            query: query.to_string(),
            search_url: search_url.to_string(),
            records,
        })
    }

    /// Enrich listings with at most `config.concurrency` detail fetches in
    /// flight. Output order matches input order.
    pub async fn enrich_all(&self, listings: Vec<ListingRecord>) -> Vec<EnrichedRecord> {
        stream::iter(listings)
            .map(|listing| self.enrich(listing))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    pub async fn enrich(&self, listing: ListingRecord) -> EnrichedRecord {
        let link = match listing.detail_link.clone() {
            Some(link) => link,
            None => {
                debug!("No detail link for {}", display_or_na(listing.title.as_ref()));
                return EnrichedRecord::unenriched(listing);
            }
        };

        info!("Fetching details for product: {}", display_or_na(listing.title.as_ref()));

        let summary = match self.detail_summary(&link).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("No price history for {}: {}", link, e);
                DetailSummary::unavailable()
            }
        };

        EnrichedRecord::new(listing, summary)
    }

    async fn detail_summary(&self, link: &str) -> Result<DetailSummary, DetailError> {
        let raw = self.fetcher.fetch(link).await?;
        summarize_detail_page(&raw)
    }
}

/// Parse a product detail page and summarize its embedded price history.
pub fn summarize_detail_page(raw: &[u8]) -> Result<DetailSummary, DetailError> {
    let doc = Document::parse(raw)?;
    let history = extract_price_history(&doc)?;
    debug!("Price history has {} points", history.len());
    Ok(summarize(&history))
}
