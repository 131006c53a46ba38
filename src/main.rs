use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use price_advisor::config::Config;
use price_advisor::report::{save_csv, save_json, Presenter, TablePresenter};
use price_advisor::{HttpFetcher, SearchPipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

/// Search a retailer and rate each product against its price history.
#[derive(Debug, Parser)]
#[command(name = "price-advisor", version, about)]
struct Args {
    /// Product search term. Prompted for when omitted.
    query: Vec<String>,

    /// Export file path (defaults to `output_path` from the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Only print the table
    #[arg(long)]
    no_export: bool,

    /// Detail pages fetched at once
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Retailer origin, e.g. https://www.amazon.com
    #[arg(long)]
    origin: Option<String>,

    #[arg(long)]
    proxy: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
    }
}

fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("price_advisor=info".parse()?);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn prompt_for_query() -> Result<String> {
    print!("Enter the product search term: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs)?;

    let mut config = Config::load()?;
    args.apply(&mut config);
    config.validate()?;
    let config = Arc::new(config);

    let query = if args.query.is_empty() {
        prompt_for_query()?
    } else {
        args.query.join(" ")
    };
    if query.is_empty() {
        bail!("A search term is required");
    }

    info!(
        "Starting search for '{}' at {}",
        query,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let fetcher = HttpFetcher::new(&config)?;
    let pipeline = SearchPipeline::new(fetcher, config.clone());

    let outcome = tokio::select! {
        result = pipeline.search(&query) => match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to fetch the web page: {:#}", anyhow::Error::from(e));
                bail!("Failed to fetch the web page.");
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Search cancelled");
            return Ok(());
        }
    };

    TablePresenter::new(io::stdout().lock())
        .present(&outcome)
        .context("Failed to print results")?;

    if args.no_export || outcome.records.is_empty() {
        return Ok(());
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_path));
    match args.format {
        ExportFormat::Csv => save_csv(&path, &outcome.records)?,
        ExportFormat::Json => save_json(&path, &outcome)?,
    }

    Ok(())
}
