use async_trait::async_trait;

use crate::error::FetchError;

mod http;
pub use http::HttpFetcher;

/// Source of raw page bytes. A non-success response is a [`FetchError`],
/// never an empty body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

