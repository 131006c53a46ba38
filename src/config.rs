use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const CONFIG_FILE_STEM: &str = "price_advisor";
pub const ENV_PREFIX: &str = "PRICE_ADVISOR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Retailer origin that search and detail links are resolved against.
    pub origin: String,
    pub search_path: String,
    pub query_param: String,
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub proxy: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Detail pages fetched at once. 1 keeps fetching sequential.
    pub concurrency: usize,
    pub output_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: "https://www.amazon.com".to_string(),
            search_path: "/s".to_string(),
            query_param: "k".to_string(),
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64; rv:107.0) Gecko/20100101 Firefox/107.0".to_string(),
            ],
            proxy: None,
            request_timeout_secs: 25,
            max_retries: 3,
            delay_min_ms: 1000,
            delay_max_ms: 3000,
            concurrency: 1,
            output_path: "amazon_products.csv".to_string(),
        }
    }
}

impl Config {
    /// Built-in defaults, overlaid by an optional `price_advisor.{toml,json,yaml}`
    /// file and then by `PRICE_ADVISOR_*` environment variables.
    pub fn load() -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .context("Failed to build default configuration")?;

        let config: Config = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("user_agents"),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.origin).with_context(|| format!("Invalid origin: {}", self.origin))?;
        ensure!(!self.user_agents.is_empty(), "At least one user agent is required");
        ensure!(self.max_retries > 0, "max_retries must be at least 1");
        ensure!(self.concurrency > 0, "concurrency must be at least 1");
        ensure!(
            self.delay_min_ms <= self.delay_max_ms,
            "delay_min_ms ({}) exceeds delay_max_ms ({})",
            self.delay_min_ms,
            self.delay_max_ms
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Search-results URL for `query`; spaces are form-encoded as `+`.
    pub fn search_url(&self, query: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.origin)?.join(&self.search_path)?;
        url.query_pairs_mut().append_pair(&self.query_param, query.trim());
        Ok(url)
    }
}
