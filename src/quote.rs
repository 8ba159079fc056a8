//! Quote payloads and normalization.
//!
//! The upstream quote API encodes prices as integers scaled by 100 and omits
//! or dashes out fields for halted or unlisted stocks. [`RawQuote`] models
//! that payload with every recognized field optional; [`Quote::from_raw`]
//! turns it into canonical prices. Normalization is a total function: field
//! absence is data, never an error.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::error::FetchError;

/// Upstream prices arrive as `fltt=1` integers, e.g. `1050` for 10.50.
pub const PRICE_SCALE: f64 = 100.0;

/// Accepts a JSON number and turns anything else (the upstream emits `"-"`
/// for fields it has no value for) into `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// One stock's quote payload as the upstream reports it, field codes and
/// scaling included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuote {
    /// Last traded price.
    #[serde(default, rename = "f43", deserialize_with = "lenient_f64")]
    pub last: Option<f64>,
    /// Session high.
    #[serde(default, rename = "f44", deserialize_with = "lenient_f64")]
    pub high: Option<f64>,
    /// Session low.
    #[serde(default, rename = "f45", deserialize_with = "lenient_f64")]
    pub low: Option<f64>,
    /// Opening price.
    #[serde(default, rename = "f46", deserialize_with = "lenient_f64")]
    pub open: Option<f64>,
    /// Previous session's close.
    #[serde(default, rename = "f60", deserialize_with = "lenient_f64")]
    pub prev_close: Option<f64>,
    /// Upstream-computed absolute change. Parsed but not trusted; see
    /// [`Quote::from_raw`].
    #[serde(default, rename = "f169", deserialize_with = "lenient_f64")]
    pub change: Option<f64>,
    /// Upstream-computed percentage change. Parsed but not trusted.
    #[serde(default, rename = "f170", deserialize_with = "lenient_f64")]
    pub change_pct: Option<f64>,
}

/// A stock quote with canonical, unscaled prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub prev_close: f64,
    pub change: f64,
    pub change_pct: f64,
}

impl Quote {
    /// The canonical fallback for a failed fetch. Every zero-quote in the
    /// system comes from here, so the degradation policy stays auditable.
    pub fn zero() -> Self {
        Quote {
            open: 0.0,
            close: 0.0,
            high: 0.0,
            low: 0.0,
            prev_close: 0.0,
            change: 0.0,
            change_pct: 0.0,
        }
    }

    /// Normalizes an upstream payload: unscale every present price, zero
    /// every absent one.
    ///
    /// The change fields are derived locally from close and previous close
    /// rather than taken from the payload, so a quote is always internally
    /// consistent regardless of which fields the upstream happened to fill
    /// in. A previous close of zero or less means there is no baseline to
    /// change against, and both change fields are forced to 0.
    pub fn from_raw(raw: &RawQuote) -> Self {
        let unscale = |field: Option<f64>| field.map_or(0.0, |v| v / PRICE_SCALE);

        let close = unscale(raw.last);
        let prev_close = unscale(raw.prev_close);
        let (change, change_pct) = if prev_close > 0.0 {
            let change = close - prev_close;
            (change, change / prev_close * 100.0)
        } else {
            (0.0, 0.0)
        };

        Quote {
            open: unscale(raw.open),
            close,
            high: unscale(raw.high),
            low: unscale(raw.low),
            prev_close,
            change,
            change_pct,
        }
    }
}

/// One outbound quote lookup against the upstream source.
///
/// Implementations return the raw payload untouched; normalization and the
/// zero-quote fallback are the fetcher's concern.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, lookup_key: &str) -> Result<RawQuote, FetchError>;
}
