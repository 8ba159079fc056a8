use std::fs;
use std::sync::Arc;
use std::time::Duration;

use fundpulse::cache::QuoteCache;
use fundpulse::fetcher::{FetcherConfig, QuoteFetcher};
use fundpulse::providers::eastmoney::EastMoneyProvider;
use fundpulse::providers::holdings_api::HoldingsApi;
use fundpulse::valuation::Estimator;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_holdings_mock_server(fund_code: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/fund/holdings"))
            .and(query_param("fundCode", fund_code))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn mount_quote(mock_server: &MockServer, secid: &str, response: &str) {
        Mock::given(method("GET"))
            .and(path("/api/qt/stock/get"))
            .and(query_param("secid", secid))
            .respond_with(ResponseTemplate::new(200).set_body_string(response))
            .mount(mock_server)
            .await;
    }
}

const HOLDINGS_RESPONSE: &str = r#"{
    "fundCode": "005550",
    "holdings": [
        {
            "stockCode": "000001.XSHE",
            "stockName": "平安银行",
            "shares": 10000,
            "costPrice": 9.0,
            "marketValue": 100.0,
            "holdPercent": 2.5
        },
        {
            "stockCode": "600000.XSHG",
            "stockName": "浦发银行",
            "shares": 8000,
            "costPrice": 8.9,
            "marketValue": 300.0,
            "holdPercent": 7.5
        }
    ]
}"#;

fn build_estimator(holdings_url: &str, quotes_url: &str, timeout: Duration) -> Estimator {
    let source = Arc::new(EastMoneyProvider::new(
        quotes_url,
        Arc::new(QuoteCache::new()),
    ));
    let fetcher = QuoteFetcher::new(source, FetcherConfig { timeout });
    Estimator::new(Arc::new(HoldingsApi::new(holdings_url)), fetcher)
}

#[test_log::test(tokio::test)]
async fn test_end_to_end_weighted_estimate() {
    let holdings_server = test_utils::create_holdings_mock_server("005550", HOLDINGS_RESPONSE).await;

    let quote_server = wiremock::MockServer::start().await;
    // 000001: 10.00 -> 11.00, +10%; 600000: 10.00 -> 9.80, -2%.
    test_utils::mount_quote(
        &quote_server,
        "0.000001",
        r#"{"data": {"f43": 1100, "f60": 1000}}"#,
    )
    .await;
    test_utils::mount_quote(
        &quote_server,
        "1.600000",
        r#"{"data": {"f43": 980, "f60": 1000}}"#,
    )
    .await;

    let estimator = build_estimator(
        &holdings_server.uri(),
        &quote_server.uri(),
        Duration::from_secs(5),
    );

    let estimate = estimator.estimate_fund_change("005550").await.unwrap();
    // (100 * 10 + 300 * -2) / 400 = 1.0
    assert_eq!(estimate.change_pct, 1.0);
    assert_eq!(estimate.total_market_value, 400.0);
    assert_eq!(estimate.change_value, 4.0);
}

#[test_log::test(tokio::test)]
async fn test_quote_failures_degrade_instead_of_erroring() {
    let holdings_server = test_utils::create_holdings_mock_server("005550", HOLDINGS_RESPONSE).await;

    // One stock answers, the other consistently fails.
    let quote_server = wiremock::MockServer::start().await;
    test_utils::mount_quote(
        &quote_server,
        "0.000001",
        r#"{"data": {"f43": 1100, "f60": 1000}}"#,
    )
    .await;
    test_utils::mount_quote(&quote_server, "1.600000", r#"{"data": null}"#).await;

    let estimator = build_estimator(
        &holdings_server.uri(),
        &quote_server.uri(),
        Duration::from_secs(5),
    );

    let snapshot = estimator.snapshot("005550").await.unwrap();

    // The failed stock still has an entry, as a zero-quote.
    assert_eq!(snapshot.quotes.len(), 2);
    let failed_id = "600000.XSHG".parse().unwrap();
    assert_eq!(snapshot.quotes[&failed_id].change_pct, 0.0);

    // Weighting still covers both market values: (100 * 10 + 300 * 0) / 400.
    assert_eq!(snapshot.estimate.change_pct, 2.5);
    assert_eq!(snapshot.estimate.total_market_value, 400.0);
}

#[test_log::test(tokio::test)]
async fn test_empty_holdings_short_circuits() {
    let holdings_server = test_utils::create_holdings_mock_server(
        "000198",
        r#"{"fundCode": "000198", "holdings": []}"#,
    )
    .await;

    // No quote server at all: resolving an empty fund must not fetch quotes.
    let estimator = build_estimator(
        &holdings_server.uri(),
        "http://127.0.0.1:9",
        Duration::from_secs(5),
    );

    let estimate = estimator.estimate_fund_change("000198").await.unwrap();
    assert_eq!(estimate.change_pct, 0.0);
    assert_eq!(estimate.total_market_value, 0.0);
}

#[test_log::test(tokio::test)]
async fn test_resolution_failure_surfaces() {
    let quote_server = wiremock::MockServer::start().await;

    // Holdings backend is unreachable; the error must reach the caller.
    let estimator = build_estimator(
        "http://127.0.0.1:9",
        &quote_server.uri(),
        Duration::from_secs(5),
    );

    let result = estimator.estimate_fund_change("005550").await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mocks() {
    let holdings_server = test_utils::create_holdings_mock_server("005550", HOLDINGS_RESPONSE).await;

    let quote_server = wiremock::MockServer::start().await;
    test_utils::mount_quote(
        &quote_server,
        "0.000001",
        r#"{"data": {"f43": 1100, "f60": 1000}}"#,
    )
    .await;
    test_utils::mount_quote(
        &quote_server,
        "1.600000",
        r#"{"data": {"f43": 980, "f60": 1000}}"#,
    )
    .await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        funds:
          - code: "005550"
        providers:
          quotes:
            base_url: {}
            timeout_secs: 5
          holdings:
            base_url: {}
    "#,
        quote_server.uri(),
        holdings_server.uri()
    );

    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = fundpulse::run(Some(config_path.to_str().unwrap()), &[]).await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}
