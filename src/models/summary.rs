use serde::{Deserialize, Serialize};
use std::fmt;

/// Prices embedded in a detail page, in the order they appear there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory(pub Vec<f64>);

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn prices(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for PriceHistory {
    fn from(prices: Vec<f64>) -> Self {
        Self(prices)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Good,
    Bad,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Good => write!(f, "Good"),
            Recommendation::Bad => write!(f, "Bad"),
        }
    }
}

/// What the price history says about a product. Every field is `None` when
/// no history was available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailSummary {
    pub highest_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

impl DetailSummary {
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// True when the summary was derived from a non-empty price history.
    pub fn is_available(&self) -> bool {
        self.recommendation.is_some()
    }
}
