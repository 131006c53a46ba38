//! Terminal rendering of search outcomes plus file exporters.

pub mod export;

pub use export::*;

use std::io::{self, Write};

use crate::models::{display_or_na, EnrichedRecord, NOT_AVAILABLE};
use crate::pipeline::SearchOutcome;

const TITLE_WIDTH: usize = 48;

/// Consumes finished records. Absent fields arrive as `None`.
pub trait Presenter {
    fn present(&mut self, outcome: &SearchOutcome) -> io::Result<()>;
}

/// Plain-text tables, followed by the subset of recommended products.
pub struct TablePresenter<W> {
    out: W,
}

impl<W: Write> TablePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn table<'a>(&mut self, records: impl IntoIterator<Item = &'a EnrichedRecord>) -> io::Result<()> {
        writeln!(
            self.out,
            "{:<width$}  {:>10}  {:>10}  {:>10}  {:<6}  {}",
            "TITLE",
            "PRICE",
            "HIGHEST",
            "LOWEST",
            "REC",
            "LINK",
            width = TITLE_WIDTH
        )?;

        for record in records {
            let listing = &record.listing;
            writeln!(
                self.out,
                "{:<width$}  {:>10}  {:>10}  {:>10}  {:<6}  {}",
                truncate(listing.title.as_deref().unwrap_or(NOT_AVAILABLE), TITLE_WIDTH),
                listing.current_price.as_deref().unwrap_or(NOT_AVAILABLE),
                format_price(record.summary.highest_price),
                format_price(record.summary.lowest_price),
                display_or_na(record.summary.recommendation.as_ref()),
                listing.detail_link.as_deref().unwrap_or(NOT_AVAILABLE),
                width = TITLE_WIDTH
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TablePresenter<W> {
    fn present(&mut self, outcome: &SearchOutcome) -> io::Result<()> {
        if outcome.records.is_empty() {
            writeln!(self.out, "No products found. Please try a different search term.")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "Found {} products for '{}'\n",
            outcome.records.len(),
            outcome.query
        )?;
        self.table(&outcome.records)?;

        writeln!(self.out)?;
        if outcome.records.iter().all(|r| !r.summary.is_available()) {
            writeln!(self.out, "No recommendation data available.")?;
        } else {
            writeln!(self.out, "Recommended Products:")?;
            self.table(outcome.records.iter().filter(|r| r.is_recommended()))?;
        }
        Ok(())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 3).collect();
    cut.push_str("...");
    cut
}
