//! Tolerant HTML document model.
//!
//! Wraps `scraper`'s html5ever tree: malformed or unbalanced markup never
//! aborts parsing, only undecodable bytes do.

use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;

/// How a query constrains the attributes of the tag it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMatch<'a> {
    Any,
    /// `attribute="value"`, exact match.
    Equals(&'a str, &'a str),
    /// One of the whitespace separated tokens of `class`.
    Class(&'a str),
}

/// A compiled `{tag, attribute}` node query.
#[derive(Debug, Clone)]
pub struct Query {
    selector: Selector,
}

impl Query {
    pub fn new(tag: &str, attr: AttrMatch<'_>) -> Result<Self, ParseError> {
        let css = match attr {
            AttrMatch::Any => tag.to_string(),
            AttrMatch::Equals(name, value) => {
                format!("{}[{}=\"{}\"]", tag, name, value.replace('"', "\\\""))
            }
            AttrMatch::Class(class) => format!("{}.{}", tag, class),
        };

        let selector = Selector::parse(&css).map_err(|_| ParseError::InvalidQuery(css.clone()))?;
        Ok(Self { selector })
    }

    pub fn tag(tag: &str) -> Result<Self, ParseError> {
        Self::new(tag, AttrMatch::Any)
    }
}

pub struct Document {
    html: Html,
}

impl Document {
    /// Bytes must be valid UTF-8. A page with even one stray invalid byte is
    /// rejected rather than decoded lossily, so callers see [`ParseError`]
    /// instead of silently mangled text.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(raw)?;
        Ok(Self::parse_str(text))
    }

    pub fn parse_str(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// All nodes matching `query`, in document order.
    pub fn select<'a>(&'a self, query: &'a Query) -> impl Iterator<Item = Node<'a>> + 'a {
        self.html.select(&query.selector).map(Node)
    }

    pub fn find_first<'a>(&'a self, query: &'a Query) -> Option<Node<'a>> {
        self.select(query).next()
    }
}

/// A single element of a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// First descendant matching `query`.
    pub fn find_first(&self, query: &Query) -> Option<Node<'a>> {
        self.0.select(&query.selector).next().map(Node)
    }

    pub fn find_all<'q>(&self, query: &'q Query) -> impl Iterator<Item = Node<'a>> + 'q
    where
        'a: 'q,
    {
        self.0.select(&query.selector).map(Node)
    }

    /// Concatenated text content with surrounding whitespace trimmed.
    pub fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    /// Trimmed text, or `None` when nothing but whitespace is left.
    pub fn non_empty_text(&self) -> Option<String> {
        Some(self.text()).filter(|text| !text.is_empty())
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn tag_name(&self) -> &'a str {
        self.0.value().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <div data-kind="item" class="card wide"><h2>  First
                </h2><span class="price">10</span></div>
            <div data-kind="item"><p>unclosed paragraph
            <div data-kind="other"><h2>Third</h2></div>
        </body></html>
    "#;

    #[test]
    fn finds_nodes_by_attribute_value() {
        let doc = Document::parse(PAGE.as_bytes()).unwrap();
        let items = Query::new("div", AttrMatch::Equals("data-kind", "item")).unwrap();

        assert_eq!(doc.select(&items).count(), 2);
    }

    #[test]
    fn finds_nodes_by_class_token() {
        let doc = Document::parse(PAGE.as_bytes()).unwrap();
        let wide = Query::new("div", AttrMatch::Class("wide")).unwrap();

        let node = doc.find_first(&wide).unwrap();
        assert_eq!(node.attr("data-kind"), Some("item"));
    }

    #[test]
    fn text_is_trimmed_and_scoped_to_subtree() {
        let doc = Document::parse(PAGE.as_bytes()).unwrap();
        let items = Query::new("div", AttrMatch::Equals("data-kind", "item")).unwrap();
        let heading = Query::tag("h2").unwrap();

        let first = doc.find_first(&items).unwrap();
        assert_eq!(first.find_first(&heading).unwrap().text(), "First");
        assert_eq!(first.find_all(&heading).count(), 1);
    }

    #[test]
    fn missing_attribute_is_none() {
        let doc = Document::parse(PAGE.as_bytes()).unwrap();
        let price = Query::new("span", AttrMatch::Class("price")).unwrap();

        let node = doc.find_first(&price).unwrap();
        assert_eq!(node.attr("href"), None);
        assert_eq!(node.tag_name(), "span");
    }

    #[test]
    fn unbalanced_markup_still_parses() {
        let doc = Document::parse(b"<div><span>open<div>nested</span>").unwrap();
        let spans = Query::tag("span").unwrap();

        assert_eq!(doc.select(&spans).count(), 1);
    }

    #[test]
    fn undecodable_bytes_are_a_parse_error() {
        let result = Document::parse(&[0x3c, 0x70, 0x3e, 0xff, 0xfe]);

        assert!(matches!(result, Err(ParseError::Undecodable(_))));
    }

    #[test]
    fn whitespace_only_text_is_absent() {
        let doc = Document::parse(b"<span class=\"price\">   </span>").unwrap();
        let price = Query::new("span", AttrMatch::Class("price")).unwrap();

        assert_eq!(doc.find_first(&price).unwrap().non_empty_text(), None);
    }
}
