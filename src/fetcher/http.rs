use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::{Client, ClientBuilder, Proxy};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::PageFetcher;

/// Fetches pages over HTTP with a rotating user agent, a politeness delay
/// before every request and exponential backoff between retries.
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
    next_agent: AtomicUsize,
    max_retries: u32,
    delay_ms: RangeInclusive<u64>,
    backoff_base: Duration,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("dnt", HeaderValue::from_static("1"));

        let mut builder = ClientBuilder::new()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(6);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy).with_context(|| format!("Invalid proxy: {}", proxy))?);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            user_agents: config.user_agents.clone(),
            next_agent: AtomicUsize::new(0),
            max_retries: config.max_retries.max(1),
            delay_ms: config.delay_min_ms.min(config.delay_max_ms)..=config.delay_max_ms,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Base of the exponential backoff; retry `n` waits `base * 2^n`.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn backoff_delay(&self, attempts: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempts))
    }

    fn next_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed) % self.user_agents.len();
        Some(self.user_agents[index].as_str())
    }

    async fn politeness_delay(&self) {
        let millis = fastrand::u64(self.delay_ms.clone());
        if millis > 0 {
            sleep(Duration::from_millis(millis)).await;
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(url);
        if let Some(agent) = self.next_user_agent() {
            request = request.header(USER_AGENT, agent);
        }

        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(http_error)?;
        debug!("Retrieved {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            self.politeness_delay().await;

            let err = match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            match &err {
                FetchError::Status { status, .. } => warn!("HTTP error {}: {}", status, url),
                other => error!("Request failed for {}: {}", url, other),
            }

            if !err.is_retryable() {
                return Err(err);
            }
            if attempts >= self.max_retries {
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff_delay(attempts);
            warn!("Retrying in {:?}... (attempt {}/{})", delay, attempts + 1, self.max_retries);
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(agents: &[&str]) -> Config {
        Config {
            user_agents: agents.iter().map(|a| a.to_string()).collect(),
            delay_min_ms: 0,
            delay_max_ms: 0,
            ..Config::default()
        }
    }

    fn fetcher(agents: &[&str]) -> HttpFetcher {
        HttpFetcher::new(&test_config(agents))
            .unwrap()
            .with_backoff_base(Duration::ZERO)
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        let fetcher = HttpFetcher::new(&test_config(&["ua"])).unwrap();

        assert_eq!(fetcher.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(fetcher.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(fetcher.backoff_delay(40), Duration::from_secs(u64::from(u32::MAX)));
        assert_eq!(
            fetcher.with_backoff_base(Duration::MAX).backoff_delay(3),
            Duration::MAX
        );
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(header("dnt", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher(&["ua"])
            .fetch(&format!("{}/s", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, b"<html>ok</html>");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(&["ua"])
            .fetch(&format!("{}/dp/missing", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let err = fetcher(&["ua"])
            .fetch(&format!("{}/s", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RetriesExhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn user_agents_rotate_between_requests() {
        let server = MockServer::start().await;
        for agent in ["agent-one", "agent-two"] {
            Mock::given(method("GET"))
                .and(header("user-agent", agent))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }

        let fetcher = fetcher(&["agent-one", "agent-two"]);
        fetcher.fetch(&server.uri()).await.unwrap();
        fetcher.fetch(&server.uri()).await.unwrap();

        server.verify().await;
    }
}
