//! Fetch a search page (and optionally one detail page), save the raw HTML
//! and report what the extractors find in it. Used when the retailer changes
//! its markup.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

use price_advisor::config::Config;
use price_advisor::parsers::{AttrMatch, Query, PRICE_HISTORY_MARKER};
use price_advisor::{extract_listings, extract_price_history, Document, HttpFetcher, PageFetcher};

#[derive(Debug, Parser)]
struct Args {
    /// Search term to fetch
    query: String,

    /// Product page to inspect for an embedded price history
    #[arg(long)]
    detail_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    let fetcher = HttpFetcher::new(&config)?;

    let url = config.search_url(&args.query)?;
    println!("Fetching {}...", url);
    let raw = fetcher.fetch(url.as_str()).await?;
    fs::write("search_sample.html", &raw)?;

    let document = Document::parse(&raw)?;

    let candidates = [
        ("div", AttrMatch::Equals("data-component-type", "s-search-result")),
        ("div", AttrMatch::Class("s-result-item")),
        ("span", AttrMatch::Class("a-price-whole")),
        ("img", AttrMatch::Class("s-image")),
        ("h2", AttrMatch::Any),
    ];
    for (tag, attr) in candidates {
        let query = Query::new(tag, attr)?;
        println!("{} {:?} matched {} elements", tag, attr, document.select(&query).count());
    }

    let listings = extract_listings(&document, &config.origin);
    let count = |field: fn(&price_advisor::ListingRecord) -> bool| listings.iter().filter(|l| field(l)).count();
    println!(
        "Extracted {} listings: {} titles, {} prices, {} images, {} links",
        listings.len(),
        count(|l| l.title.is_some()),
        count(|l| l.current_price.is_some()),
        count(|l| l.image_url.is_some()),
        count(|l| l.detail_link.is_some()),
    );

    if let Some(detail_url) = args.detail_url {
        println!("\nFetching {}...", detail_url);
        let raw = fetcher.fetch(&detail_url).await?;
        fs::write("detail_sample.html", &raw)?;

        let document = Document::parse(&raw)?;
        let scripts = Query::tag("script")?;
        let marked = document
            .select(&scripts)
            .filter(|s| s.text().contains(PRICE_HISTORY_MARKER))
            .count();
        println!("{} scripts mention {}", marked, PRICE_HISTORY_MARKER);

        let history = extract_price_history(&document).context("Price history is malformed")?;
        println!("Price history: {:?}", history.prices());
    }

    Ok(())
}
