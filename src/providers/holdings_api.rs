use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::error::ResolutionError;
use crate::holdings::{Holding, HoldingsResolver};

/// Holdings resolver backed by the fund holdings JSON API.
///
/// The backend aggregates each fund's latest published quarterly report; a
/// fund without stock holdings (bond or money-market) legitimately comes
/// back with an empty list.
pub struct HoldingsApi {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HoldingsResponse {
    #[allow(dead_code)]
    #[serde(rename = "fundCode")]
    fund_code: String,
    holdings: Vec<ApiHolding>,
}

#[derive(Debug, Deserialize)]
struct ApiHolding {
    #[serde(rename = "stockCode")]
    stock_code: String,
    #[serde(rename = "stockName")]
    stock_name: String,
    #[serde(default)]
    shares: f64,
    #[serde(default, rename = "costPrice")]
    cost_price: f64,
    #[serde(default, rename = "marketValue")]
    market_value: Option<f64>,
    #[serde(default, rename = "holdPercent")]
    hold_percent: Option<f64>,
}

impl HoldingsApi {
    pub fn new(base_url: &str) -> Self {
        HoldingsApi {
            base_url: base_url.to_string(),
        }
    }
}

impl TryFrom<ApiHolding> for Holding {
    type Error = ResolutionError;

    fn try_from(api: ApiHolding) -> Result<Self, Self::Error> {
        Ok(Holding {
            identifier: api.stock_code.parse()?,
            name: api.stock_name,
            shares: api.shares,
            cost_price: api.cost_price,
            market_value: api.market_value,
            weight_pct: api.hold_percent,
        })
    }
}

#[async_trait]
impl HoldingsResolver for HoldingsApi {
    #[instrument(name = "HoldingsResolve", skip(self), fields(fund_code = %fund_code))]
    async fn resolve(&self, fund_code: &str) -> Result<Vec<Holding>, ResolutionError> {
        // Fund codes are 6 digits, left-padded with zeros.
        let fund_code = format!("{fund_code:0>6}");
        let url = format!(
            "{}/api/fund/holdings?fundCode={}",
            self.base_url, fund_code
        );
        debug!("Requesting holdings from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fundpulse/0.1")
            .build()?;
        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ResolutionError::Status(response.status()));
        }

        let text = response.text().await?;
        let parsed: HoldingsResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse holdings response");
                return Err(ResolutionError::Parse(e.to_string()));
            }
        };

        let holdings = parsed
            .holdings
            .into_iter()
            .map(Holding::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = holdings.len(), "Resolved holdings");
        Ok(holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Venue;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(fund_code: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/fund/holdings"))
            .and(query_param("fundCode", fund_code))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    const MOCK_HOLDINGS: &str = r#"{
        "fundCode": "005550",
        "holdings": [
            {
                "stockCode": "000001.XSHE",
                "stockName": "平安银行",
                "shares": 10000,
                "costPrice": 12.5,
                "marketValue": 125000.0,
                "holdPercent": 8.2
            },
            {
                "stockCode": "600000.XSHG",
                "stockName": "浦发银行",
                "shares": 8000,
                "costPrice": 8.9
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_resolve_holdings() {
        let mock_server = create_mock_server("005550", MOCK_HOLDINGS).await;
        let resolver = HoldingsApi::new(&mock_server.uri());

        let holdings = resolver.resolve("005550").await.unwrap();
        assert_eq!(holdings.len(), 2);

        assert_eq!(holdings[0].identifier.code(), "000001");
        assert_eq!(holdings[0].identifier.venue(), Venue::Shenzhen);
        assert_eq!(holdings[0].name, "平安银行");
        assert_eq!(holdings[0].shares, 10000.0);
        assert_eq!(holdings[0].market_value, Some(125000.0));
        assert_eq!(holdings[0].weight_pct, Some(8.2));

        assert_eq!(holdings[1].identifier.venue(), Venue::Shanghai);
        assert_eq!(holdings[1].market_value, None);
    }

    #[tokio::test]
    async fn test_fund_code_is_zero_padded() {
        let mock_server =
            create_mock_server("000123", r#"{"fundCode": "000123", "holdings": []}"#).await;
        let resolver = HoldingsApi::new(&mock_server.uri());

        let holdings = resolver.resolve("123").await.unwrap();
        assert!(holdings.is_empty());
    }

    #[tokio::test]
    async fn test_empty_holdings_is_not_an_error() {
        let mock_server =
            create_mock_server("005550", r#"{"fundCode": "005550", "holdings": []}"#).await;
        let resolver = HoldingsApi::new(&mock_server.uri());

        let holdings = resolver.resolve("005550").await.unwrap();
        assert!(holdings.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_surfaces() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/fund/holdings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let resolver = HoldingsApi::new(&mock_server.uri());
        let result = resolver.resolve("005550").await;
        assert!(matches!(
            result,
            Err(ResolutionError::Status(status)) if status.as_u16() == 500
        ));
    }

    #[tokio::test]
    async fn test_malformed_payload_surfaces() {
        let mock_server = create_mock_server("005550", "<html>busy</html>").await;
        let resolver = HoldingsApi::new(&mock_server.uri());

        let result = resolver.resolve("005550").await;
        assert!(matches!(result, Err(ResolutionError::Parse(_))));
    }

    #[tokio::test]
    async fn test_invalid_stock_identifier_surfaces() {
        let mock_response = r#"{
            "fundCode": "005550",
            "holdings": [
                {"stockCode": "430047.XBJE", "stockName": "诺思兰德", "shares": 100}
            ]
        }"#;
        let mock_server = create_mock_server("005550", mock_response).await;
        let resolver = HoldingsApi::new(&mock_server.uri());

        let result = resolver.resolve("005550").await;
        assert!(matches!(result, Err(ResolutionError::Identifier(_))));
    }
}
