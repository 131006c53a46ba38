use serde::Serialize;

use crate::models::{DetailSummary, PriceHistory, Recommendation};

/// The figures a recommendation is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
    /// Last element of the series as embedded in the page. Treated as the
    /// current price, which the page does not actually guarantee.
    pub current: f64,
}

impl PriceStats {
    pub fn from_history(history: &PriceHistory) -> Option<Self> {
        let prices = history.prices();
        let current = *prices.last()?;

        let highest = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let count = prices.len() as f64;
        let sum = prices.iter().sum::<f64>();
        // Large finite prices can overflow the plain sum.
        let average = if sum.is_finite() {
            sum / count
        } else {
            prices.iter().map(|price| price / count).sum()
        };

        Some(Self {
            highest,
            lowest,
            average,
            current,
        })
    }

    pub fn recommendation(&self) -> Recommendation {
        if self.current < self.average {
            Recommendation::Good
        } else {
            Recommendation::Bad
        }
    }
}

/// Summarize a price history. An empty history yields an all-absent summary.
pub fn summarize(history: &PriceHistory) -> DetailSummary {
    match PriceStats::from_history(history) {
        Some(stats) => DetailSummary {
            highest_price: Some(stats.highest),
            lowest_price: Some(stats.lowest),
            recommendation: Some(stats.recommendation()),
        },
        None => DetailSummary::unavailable(),
    }
}
