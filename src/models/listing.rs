use serde::{Deserialize, Serialize};

use super::{DetailSummary, Recommendation};

/// One product card from a search-results page. `None` means the field is
/// not present in the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: Option<String>,
    pub current_price: Option<String>,
    pub image_url: Option<String>,
    pub detail_link: Option<String>,
}

/// A listing merged with the summary of its detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub listing: ListingRecord,
    #[serde(flatten)]
    pub summary: DetailSummary,
}

impl EnrichedRecord {
    pub fn new(listing: ListingRecord, summary: DetailSummary) -> Self {
        Self { listing, summary }
    }

    pub fn unenriched(listing: ListingRecord) -> Self {
        Self::new(listing, DetailSummary::unavailable())
    }

    pub fn is_recommended(&self) -> bool {
        self.summary.recommendation == Some(Recommendation::Good)
    }
}
