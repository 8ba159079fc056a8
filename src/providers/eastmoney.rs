use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::cache::QuoteCache;
use crate::error::FetchError;
use crate::quote::{QuoteSource, RawQuote};

const QUOTE_FIELDS: &str = "f43,f44,f45,f46,f60,f169,f170";

/// Quote source backed by the EastMoney push2 API.
///
/// One GET per stock; the payload comes back with `fltt=1` integer-scaled
/// prices which [`RawQuote`](crate::quote::RawQuote) models untouched. A
/// halted or unknown stock yields `"data": null`, reported as
/// [`FetchError::Empty`].
pub struct EastMoneyProvider {
    base_url: String,
    cache: Arc<QuoteCache>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    data: Option<RawQuote>,
}

impl EastMoneyProvider {
    pub fn new(base_url: &str, cache: Arc<QuoteCache>) -> Self {
        EastMoneyProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl QuoteSource for EastMoneyProvider {
    #[instrument(name = "EastMoneyQuoteFetch", skip(self), fields(lookup_key = %lookup_key))]
    async fn fetch_quote(&self, lookup_key: &str) -> Result<RawQuote, FetchError> {
        if let Some(cached) = self.cache.get(lookup_key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/api/qt/stock/get?invt=2&fltt=1&fields={}&secid={}",
            self.base_url, QUOTE_FIELDS, lookup_key
        );
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fundpulse/0.1")
            .build()?;
        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let text = response.text().await?;
        let parsed: QuoteResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse quote response");
                return Err(FetchError::Parse(e));
            }
        };

        let raw = parsed.data.ok_or(FetchError::Empty)?;
        self.cache.put(lookup_key.to_string(), raw.clone()).await;
        Ok(raw)
    }
}
