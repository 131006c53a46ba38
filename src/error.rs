use reqwest::StatusCode;
use thiserror::Error;

/// Failure to obtain a page from the fetcher. No document is available.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: StatusCode },
    #[error("failed to fetch {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Transport failures, server errors and throttling are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { .. } => true,
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::RetriesExhausted { .. } => false,
        }
    }
}

/// The markup parser could not produce a document, or a node query was invalid.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("page is not decodable as markup: {0}")]
    Undecodable(#[from] std::str::Utf8Error),
    #[error("invalid node query `{0}`")]
    InvalidQuery(String),
}

/// The price-history marker was found but the list that follows it is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailParseError {
    #[error("no `[` follows the price history marker")]
    MissingList,
    #[error("price history list is not terminated by `]`")]
    Unterminated,
    #[error("price history list contains a nested list")]
    NestedList,
    #[error("price history element {index} is not a number: {token:?}")]
    InvalidNumber { index: usize, token: String },
}

/// Failures confined to one detail page. The listing keeps an absent summary.
#[derive(Debug, Error)]
pub enum DetailError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    History(#[from] DetailParseError),
}

/// Failures that abort a whole search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to fetch the search results page")]
    Fetch(#[source] FetchError),
    #[error("failed to parse the search results page")]
    Parse(#[source] ParseError),
}
