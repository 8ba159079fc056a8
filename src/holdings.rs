//! Fund holdings and the resolver abstraction.

use async_trait::async_trait;

use crate::error::ResolutionError;
use crate::identifier::StockIdentifier;

/// A fund's position in one stock, as published in its latest report.
///
/// Holdings are produced fresh on every resolution and treated as immutable
/// inputs; the pipeline never mutates or persists them.
#[derive(Debug, Clone)]
pub struct Holding {
    pub identifier: StockIdentifier,
    pub name: String,
    pub shares: f64,
    pub cost_price: f64,
    /// Market value of the position, when the reporting source provides it.
    pub market_value: Option<f64>,
    /// Weight of the position as a percent of fund net value, when known.
    pub weight_pct: Option<f64>,
}

/// Resolves a fund code to its current holdings list.
///
/// An empty list is a valid answer (bond and money-market funds publish no
/// stock holdings), not an error.
#[async_trait]
pub trait HoldingsResolver: Send + Sync {
    async fn resolve(&self, fund_code: &str) -> Result<Vec<Holding>, ResolutionError>;
}
