use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::models::{display_or_na, EnrichedRecord, NOT_AVAILABLE};
use crate::pipeline::SearchOutcome;

/// Flat CSV row. Absent fields are written as `N/A`.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    current_price: &'a str,
    image_url: &'a str,
    link: &'a str,
    highest_price: String,
    lowest_price: String,
    recommendation: String,
}

impl<'a> From<&'a EnrichedRecord> for CsvRow<'a> {
    fn from(record: &'a EnrichedRecord) -> Self {
        let listing = &record.listing;
        Self {
            title: listing.title.as_deref().unwrap_or(NOT_AVAILABLE),
            current_price: listing.current_price.as_deref().unwrap_or(NOT_AVAILABLE),
            image_url: listing.image_url.as_deref().unwrap_or(NOT_AVAILABLE),
            link: listing.detail_link.as_deref().unwrap_or(NOT_AVAILABLE),
            highest_price: format_price(record.summary.highest_price),
            lowest_price: format_price(record.summary.lowest_price),
            recommendation: display_or_na(record.summary.recommendation.as_ref()),
        }
    }
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("{:.2}", price),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn write_csv<W: Write>(writer: W, records: &[EnrichedRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(CsvRow::from(record))?;
    }
    csv.flush()?;
    Ok(())
}

/// Pretty JSON of the whole outcome. Absent fields are `null`.
pub fn write_json<W: Write>(writer: W, outcome: &SearchOutcome) -> Result<()> {
    serde_json::to_writer_pretty(writer, outcome)?;
    Ok(())
}

pub fn save_csv(path: &Path, records: &[EnrichedRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, records)?;
    info!("Products have been saved to {}", path.display());
    Ok(())
}

pub fn save_json(path: &Path, outcome: &SearchOutcome) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_json(file, outcome)?;
    info!("Products have been saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailSummary, ListingRecord, Recommendation};
    use pretty_assertions::assert_eq;

    fn records() -> Vec<EnrichedRecord> {
        vec![
            EnrichedRecord::new(
                ListingRecord {
                    title: Some("Kettle, steel".to_string()),
                    current_price: Some("39.".to_string()),
                    image_url: None,
                    detail_link: Some("https://shop.test/dp/K1".to_string()),
                },
                DetailSummary {
                    highest_price: Some(50.0),
                    lowest_price: Some(29.5),
                    recommendation: Some(Recommendation::Good),
                },
            ),
            EnrichedRecord::unenriched(ListingRecord {
                title: Some("Teapot".to_string()),
                ..ListingRecord::default()
            }),
        ]
    }

    #[test]
    fn csv_marks_absent_fields() {
        let mut out = Vec::new();
        write_csv(&mut out, &records()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "title,current_price,image_url,link,highest_price,lowest_price,recommendation\n\
             \"Kettle, steel\",39.,N/A,https://shop.test/dp/K1,50.00,29.50,Good\n\
             Teapot,N/A,N/A,N/A,N/A,N/A,N/A\n"
        );
    }

    #[test]
    fn json_uses_null_for_absent_fields() {
        let outcome = SearchOutcome {
            query: "kettle".to_string(),
            search_url: "https://shop.test/s?k=kettle".to_string(),
            records: records(),
        };
        let mut out = Vec::new();
        write_json(&mut out, &outcome).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["records"][0]["recommendation"], "Good");
        assert_eq!(value["records"][0]["highest_price"], 50.0);
        assert!(value["records"][1]["current_price"].is_null());
        assert!(value["records"][1]["recommendation"].is_null());
    }
}
