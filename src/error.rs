//! Error taxonomy for the valuation pipeline.
//!
//! Only [`ResolutionError`] is allowed to reach the caller: without a
//! holdings list there is nothing sensible to estimate. A [`FetchError`] is
//! always absorbed by the quote fetcher and converted into a zero-quote.

use reqwest::StatusCode;
use thiserror::Error;

/// A stock identifier could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("security code must be 6 digits, got '{0}'")]
    InvalidCode(String),

    #[error("unrecognized venue qualifier '{qualifier}' in '{identifier}'")]
    UnknownVenue {
        identifier: String,
        qualifier: String,
    },
}

/// The holdings lookup for a fund failed.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("holdings request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("holdings lookup returned HTTP {0}")]
    Status(StatusCode),

    #[error("failed to parse holdings payload: {0}")]
    Parse(String),

    #[error("holdings payload contains an invalid stock identifier: {0}")]
    Identifier(#[from] IdentifierError),
}

/// A single quote lookup failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote lookup returned HTTP {0}")]
    Status(StatusCode),

    #[error("quote payload was empty")]
    Empty,

    #[error("failed to parse quote payload: {0}")]
    Parse(#[from] serde_json::Error),
}
