//! Price history embedded in a product page's inline scripts.
//!
//! The series is a JavaScript array literal that follows a `priceHistory`
//! marker, e.g. `var data = { priceHistory: [19.99, 24.5, 21] };`.

use once_cell::sync::Lazy;

use crate::error::DetailParseError;
use crate::models::PriceHistory;
use crate::parsers::markup::{Document, Query};

pub const PRICE_HISTORY_MARKER: &str = "priceHistory";

static SCRIPT: Lazy<Query> = Lazy::new(|| Query::tag("script").expect("Invalid script query"));

/// Read the price series from the first script that carries the marker.
///
/// Returns an empty history when no script mentions the marker. Later
/// scripts are never consulted, even if the first one yields nothing.
pub fn extract_price_history(doc: &Document) -> Result<PriceHistory, DetailParseError> {
    let script = doc
        .select(&SCRIPT)
        .map(|node| node.text())
        .find(|text| text.contains(PRICE_HISTORY_MARKER));

    match script {
        Some(text) => parse_marked_series(&text),
        None => Ok(PriceHistory::default()),
    }
}

/// Parse the list following the first marker occurrence in `source`.
pub fn parse_marked_series(source: &str) -> Result<PriceHistory, DetailParseError> {
    let Some(marker_at) = source.find(PRICE_HISTORY_MARKER) else {
        return Ok(PriceHistory::default());
    };

    let after_marker = &source[marker_at + PRICE_HISTORY_MARKER.len()..];
    let body = bracketed_segment(after_marker)?;
    decode_number_list(body).map(PriceHistory)
}

/// The text strictly between the first `[` and its matching `]`.
fn bracketed_segment(source: &str) -> Result<&str, DetailParseError> {
    let open = source.find('[').ok_or(DetailParseError::MissingList)?;
    let rest = &source[open + 1..];

    for (offset, ch) in rest.char_indices() {
        match ch {
            ']' => return Ok(&rest[..offset]),
            '[' => return Err(DetailParseError::NestedList),
            _ => {}
        }
    }

    Err(DetailParseError::Unterminated)
}

fn decode_number_list(body: &str) -> Result<Vec<f64>, DetailParseError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    body.split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            token
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| DetailParseError::InvalidNumber {
                    index,
                    token: token.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detail_page(scripts: &[&str]) -> Document {
        let body: String = scripts
            .iter()
            .map(|s| format!("<script type=\"text/javascript\">{}</script>", s))
            .collect();
        Document::parse_str(&format!(
            "<html><head><script src=\"/app.js\"></script></head><body>{}</body></html>",
            body
        ))
    }

    #[test]
    fn reads_series_after_marker() {
        let doc = detail_page(&[
            "window.ue = {};",
            "var state = {\"priceHistory\": [19.99, 24.5, 21]};",
        ]);

        let history = extract_price_history(&doc).unwrap();
        assert_eq!(history.prices(), &[19.99, 24.5, 21.0]);
    }

    #[test]
    fn brackets_before_the_marker_are_ignored() {
        let history = parse_marked_series("var xs = [1, 2]; priceHistory = [ 5 ,6 ];").unwrap();

        assert_eq!(history.prices(), &[5.0, 6.0]);
    }

    #[test]
    fn no_marker_means_empty_history() {
        let doc = detail_page(&["var prices = [1, 2, 3];"]);

        assert!(extract_price_history(&doc).unwrap().is_empty());
    }

    #[test]
    fn empty_list_is_empty_history() {
        assert!(parse_marked_series("priceHistory: []").unwrap().is_empty());
    }

    #[test]
    fn only_first_marked_script_is_consulted() {
        let doc = detail_page(&[
            "priceHistory: [10, 20]",
            "priceHistory: [30, 40, 50]",
        ]);

        assert_eq!(extract_price_history(&doc).unwrap().prices(), &[10.0, 20.0]);
    }

    #[test]
    fn malformed_element_is_an_error() {
        let doc = detail_page(&["priceHistory: [10, \"n/a\", 30]"]);

        assert_eq!(
            extract_price_history(&doc),
            Err(DetailParseError::InvalidNumber {
                index: 1,
                token: "\"n/a\"".to_string()
            })
        );
    }

    #[test]
    fn trailing_comma_is_an_error() {
        assert_eq!(
            parse_marked_series("priceHistory: [1, 2,]"),
            Err(DetailParseError::InvalidNumber {
                index: 2,
                token: String::new()
            })
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(matches!(
            parse_marked_series("priceHistory: [1, NaN]"),
            Err(DetailParseError::InvalidNumber { index: 1, .. })
        ));
        assert!(parse_marked_series("priceHistory: [inf]").is_err());
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            parse_marked_series("priceHistory: null"),
            Err(DetailParseError::MissingList)
        );
        assert_eq!(
            parse_marked_series("priceHistory: [1, 2"),
            Err(DetailParseError::Unterminated)
        );
        assert_eq!(
            parse_marked_series("priceHistory: [[1, 2], [3, 4]]"),
            Err(DetailParseError::NestedList)
        );
    }
}
