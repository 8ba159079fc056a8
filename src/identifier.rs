//! Exchange-qualified stock identifiers.
//!
//! Holdings payloads qualify each security code with the venue it trades on
//! (`600000.XSHG` for Shanghai, `000001.XSHE` for Shenzhen). The quote
//! upstream instead wants a `secid` of the form `{market}.{code}` where the
//! market is `1` for Shanghai and `0` for Shenzhen. [`StockIdentifier`] is
//! the bridge between the two encodings.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::IdentifierError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Venue {
    Shanghai,
    Shenzhen,
}

impl Venue {
    /// Venue qualifier used in holdings payloads.
    pub fn qualifier(&self) -> &'static str {
        match self {
            Venue::Shanghai => "XSHG",
            Venue::Shenzhen => "XSHE",
        }
    }

    /// Market code used in quote lookup keys.
    pub fn market_code(&self) -> &'static str {
        match self {
            Venue::Shanghai => "1",
            Venue::Shenzhen => "0",
        }
    }

    fn from_qualifier(qualifier: &str) -> Option<Venue> {
        match qualifier {
            "XSHG" => Some(Venue::Shanghai),
            "XSHE" => Some(Venue::Shenzhen),
            _ => None,
        }
    }

    /// Infers the venue from a bare security code. Shanghai listings start
    /// with `6` (main board) or `5` (funds); everything else trades in
    /// Shenzhen.
    fn from_code(code: &str) -> Venue {
        if code.starts_with('6') || code.starts_with('5') {
            Venue::Shanghai
        } else {
            Venue::Shenzhen
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StockIdentifier {
    code: String,
    venue: Venue,
}

impl StockIdentifier {
    pub fn new(code: &str, venue: Venue) -> Result<Self, IdentifierError> {
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdentifierError::InvalidCode(code.to_string()));
        }
        Ok(StockIdentifier {
            code: code.to_string(),
            venue,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn venue(&self) -> Venue {
        self.venue
    }

    /// The venue-qualified key used to query the quote upstream, e.g.
    /// `1.600000` for Shanghai or `0.000001` for Shenzhen.
    pub fn lookup_key(&self) -> String {
        format!("{}.{}", self.venue.market_code(), self.code)
    }
}

impl FromStr for StockIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((code, qualifier)) => {
                let venue = Venue::from_qualifier(qualifier).ok_or_else(|| {
                    IdentifierError::UnknownVenue {
                        identifier: s.to_string(),
                        qualifier: qualifier.to_string(),
                    }
                })?;
                StockIdentifier::new(code, venue)
            }
            None => StockIdentifier::new(s, Venue::from_code(s)),
        }
    }
}

/// Display uses the holdings-payload form so log lines and table rows match
/// what the upstream reports.
impl Display for StockIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.code, self.venue.qualifier())
    }
}
