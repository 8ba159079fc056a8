pub mod cache;
pub mod config;
pub mod error;
pub mod estimate;
pub mod fetcher;
pub mod holdings;
pub mod identifier;
pub mod log;
pub mod providers;
pub mod quote;
pub mod ui;
pub mod valuation;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::cache::QuoteCache;
use crate::config::{AppConfig, FundEntry};
use crate::fetcher::{FetcherConfig, QuoteFetcher};
use crate::providers::eastmoney::EastMoneyProvider;
use crate::providers::holdings_api::HoldingsApi;
use crate::valuation::Estimator;

/// Runs the `estimate` command: fund codes given on the command line take
/// precedence over the configured fund list.
pub async fn run(config_path: Option<&str>, fund_codes: &[String]) -> Result<()> {
    info!("fundpulse starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let estimator = build_estimator(&config);

    let funds: Vec<FundEntry> = if fund_codes.is_empty() {
        config.funds.clone()
    } else {
        fund_codes
            .iter()
            .map(|code| FundEntry {
                code: code.clone(),
                name: None,
            })
            .collect()
    };

    estimate::run(&estimator, &funds).await
}

fn build_estimator(config: &AppConfig) -> Estimator {
    let quote_cache = Arc::new(QuoteCache::new());

    let (quotes_base_url, timeout_secs) = config
        .providers
        .quotes
        .as_ref()
        .map_or(("https://push2.eastmoney.com", 5), |p| {
            (p.base_url.as_str(), p.timeout_secs)
        });
    let source = Arc::new(EastMoneyProvider::new(quotes_base_url, quote_cache));
    let fetcher = QuoteFetcher::new(
        source,
        FetcherConfig {
            timeout: Duration::from_secs(timeout_secs),
        },
    );

    let holdings_base_url = config
        .providers
        .holdings
        .as_ref()
        .map_or("http://localhost:8000", |p| &p.base_url);
    let resolver = Arc::new(HoldingsApi::new(holdings_base_url));

    Estimator::new(resolver, fetcher)
}
