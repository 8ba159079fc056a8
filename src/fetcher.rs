//! Concurrent per-stock quote fetching with a bounded timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::identifier::StockIdentifier;
use crate::quote::{Quote, QuoteSource};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Explicit fetcher configuration, passed in at construction.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Budget for a single quote lookup, not for the whole batch.
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fans out one lookup task per identifier and joins them into a quote map.
///
/// Failures are contained per stock: a lookup that times out, errors, or
/// returns garbage resolves to [`Quote::zero`] without touching any other
/// entry, and the returned map always holds exactly one entry per requested
/// identifier. There are no retries; a failed fetch costs at most one
/// timeout, so batch latency is bounded by the per-task timeout regardless
/// of how many stocks a fund holds.
pub struct QuoteFetcher {
    source: Arc<dyn QuoteSource>,
    timeout: Duration,
}

impl QuoteFetcher {
    pub fn new(source: Arc<dyn QuoteSource>, config: FetcherConfig) -> Self {
        QuoteFetcher {
            source,
            timeout: config.timeout,
        }
    }

    pub async fn fetch_quotes(
        &self,
        identifiers: &[StockIdentifier],
    ) -> HashMap<StockIdentifier, Quote> {
        let lookups = identifiers.iter().map(|id| async move {
            let quote = self.fetch_one(id).await;
            (id.clone(), quote)
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn fetch_one(&self, identifier: &StockIdentifier) -> Quote {
        let lookup_key = identifier.lookup_key();
        match tokio::time::timeout(self.timeout, self.source.fetch_quote(&lookup_key)).await {
            Ok(Ok(raw)) => {
                let quote = Quote::from_raw(&raw);
                debug!(%identifier, close = quote.close, change_pct = quote.change_pct, "Quote fetched");
                quote
            }
            Ok(Err(e)) => {
                warn!(%identifier, error = %e, "Quote fetch failed, substituting zero-quote");
                Quote::zero()
            }
            Err(_) => {
                warn!(%identifier, timeout = ?self.timeout, "Quote fetch timed out, substituting zero-quote");
                Quote::zero()
            }
        }
    }
}
