use once_cell::sync::Lazy;
use tracing::debug;
use url::Url;

use crate::models::ListingRecord;
use crate::parsers::markup::{AttrMatch, Document, Node, Query};

static RESULT_CONTAINER: Lazy<Query> = Lazy::new(|| {
    Query::new("div", AttrMatch::Equals("data-component-type", "s-search-result"))
        .expect("Invalid result container query")
});

static HEADING: Lazy<Query> = Lazy::new(|| Query::tag("h2").expect("Invalid heading query"));

static ANCHOR: Lazy<Query> = Lazy::new(|| Query::tag("a").expect("Invalid anchor query"));

static PRICE_WHOLE: Lazy<Query> = Lazy::new(|| {
    Query::new("span", AttrMatch::Class("a-price-whole")).expect("Invalid price query")
});

static LISTING_IMAGE: Lazy<Query> = Lazy::new(|| {
    Query::new("img", AttrMatch::Class("s-image")).expect("Invalid image query")
});

/// Extract one record per search-result container, in document order.
///
/// An empty vector means the page had no listings; it is not an error.
/// Relative detail links are resolved against `origin`.
pub fn extract_listings(doc: &Document, origin: &str) -> Vec<ListingRecord> {
    let base = Url::parse(origin).ok();

    let listings: Vec<ListingRecord> = doc
        .select(&RESULT_CONTAINER)
        .map(|container| extract_listing(container, base.as_ref()))
        .collect();

    debug!("Matched {} result containers", listings.len());
    listings
}

fn extract_listing(container: Node<'_>, base: Option<&Url>) -> ListingRecord {
    let heading = container.find_first(&HEADING);

    let title = heading.and_then(|h| h.non_empty_text());

    let current_price = container
        .find_first(&PRICE_WHOLE)
        .and_then(|price| price.non_empty_text());

    let image_url = container.find_first(&LISTING_IMAGE).and_then(|img| {
        img.attr("src")
            .or_else(|| img.attr("data-src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
    });

    let detail_link = heading
        .and_then(|h| h.find_first(&ANCHOR))
        .and_then(|a| a.attr("href"))
        .and_then(|href| resolve_link(href, base));

    ListingRecord {
        title,
        current_price,
        image_url,
        detail_link,
    }
}

fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match base {
        Some(base) => base.join(href).ok().map(|url| url.to_string()),
        None => Url::parse(href).ok().map(|url| url.to_string()),
    }
}
