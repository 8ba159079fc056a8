//! Value-weighted fund estimation.
//!
//! The aggregation is a pure function over holdings and quotes: holdings
//! that lack a market value or a quote entry are skipped, so partial quote
//! coverage degrades precision instead of invalidating the estimate. Zero
//! coverage yields an explicit 0 with a zero total market value, which is
//! the caller's low-confidence signal.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ResolutionError;
use crate::fetcher::QuoteFetcher;
use crate::holdings::{Holding, HoldingsResolver};
use crate::identifier::StockIdentifier;
use crate::quote::Quote;

/// A fund-level estimate derived from current holdings and quotes.
/// Recomputed on every request, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationEstimate {
    pub fund_code: String,
    /// Value-weighted mean of per-stock change percent, rounded to 2 dp.
    pub change_pct: f64,
    /// Market value that actually participated in the weighting.
    pub total_market_value: f64,
    /// Absolute value change implied by the estimate.
    pub change_value: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the value-weighted mean change for a fund.
///
/// Each holding with both a market value and a quote contributes its market
/// value to the denominator and `market_value * change_pct` to the
/// numerator. A total of zero means no holding qualified and the estimate
/// is 0 by definition.
pub fn estimate_change(
    fund_code: &str,
    holdings: &[Holding],
    quotes: &HashMap<StockIdentifier, Quote>,
) -> ValuationEstimate {
    let mut total_market_value = 0.0;
    let mut weighted_sum = 0.0;

    for holding in holdings {
        let (Some(market_value), Some(quote)) =
            (holding.market_value, quotes.get(&holding.identifier))
        else {
            continue;
        };
        total_market_value += market_value;
        weighted_sum += market_value * quote.change_pct;
    }

    if total_market_value <= 0.0 {
        return ValuationEstimate {
            fund_code: fund_code.to_string(),
            change_pct: 0.0,
            total_market_value: 0.0,
            change_value: 0.0,
        };
    }

    let change_pct = round2(weighted_sum / total_market_value);
    ValuationEstimate {
        fund_code: fund_code.to_string(),
        change_pct,
        total_market_value: round2(total_market_value),
        change_value: round2(total_market_value * change_pct / 100.0),
    }
}

/// A fund's estimate together with the inputs it was computed from, for
/// per-holding display.
#[derive(Debug)]
pub struct FundSnapshot {
    pub holdings: Vec<Holding>,
    pub quotes: HashMap<StockIdentifier, Quote>,
    pub estimate: ValuationEstimate,
}

/// Composes holdings resolution, quote fetching, and aggregation.
///
/// Only holdings resolution is allowed to fail: once a holdings list exists,
/// every per-stock problem has already been folded into a zero-quote and an
/// estimate is always produced.
pub struct Estimator {
    resolver: Arc<dyn HoldingsResolver>,
    fetcher: QuoteFetcher,
}

impl Estimator {
    pub fn new(resolver: Arc<dyn HoldingsResolver>, fetcher: QuoteFetcher) -> Self {
        Estimator { resolver, fetcher }
    }

    /// Estimates one fund's intraday change.
    pub async fn estimate_fund_change(
        &self,
        fund_code: &str,
    ) -> Result<ValuationEstimate, ResolutionError> {
        Ok(self.snapshot(fund_code).await?.estimate)
    }

    /// Like [`Self::estimate_fund_change`] but keeps the resolved holdings
    /// and fetched quotes for display.
    pub async fn snapshot(&self, fund_code: &str) -> Result<FundSnapshot, ResolutionError> {
        let holdings = self.resolver.resolve(fund_code).await?;

        // No resolvable stock holdings (e.g. a bond fund): report a zero
        // estimate without bothering the quote upstream.
        if holdings.is_empty() {
            return Ok(FundSnapshot {
                estimate: estimate_change(fund_code, &holdings, &HashMap::new()),
                holdings,
                quotes: HashMap::new(),
            });
        }

        let mut identifiers: Vec<StockIdentifier> =
            holdings.iter().map(|h| h.identifier.clone()).collect();
        identifiers.sort();
        identifiers.dedup();

        let quotes = self.fetcher.fetch_quotes(&identifiers).await;
        let estimate = estimate_change(fund_code, &holdings, &quotes);

        Ok(FundSnapshot {
            holdings,
            quotes,
            estimate,
        })
    }
}
