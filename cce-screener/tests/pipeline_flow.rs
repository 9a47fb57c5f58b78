//! End-to-end pipeline test: filter state → query → backend → post-process
//! → sort → export, over a mock backend.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cce_common::config::Config;
use cce_screener::filters::Moneyness;
use cce_screener::postprocess::SortField;
use cce_screener::session::{ScanOutcome, ScanSession};

fn opportunity(symbol: &str, stock_price: f64, strike: f64, delta: f64, score: f64) -> serde_json::Value {
    json!({
        "symbol": symbol,
        "stock_price": stock_price,
        "strike": strike,
        "expiry": "2025-12-19",
        "dte": 30,
        "premium": 1.5,
        "roi_pct": 1.2,
        "delta": delta,
        "volume": 500,
        "open_interest": 2000,
        "score": score
    })
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    config
}

#[tokio::test]
async fn scan_applies_client_predicates_then_sorts_then_exports() {
    let server = MockServer::start().await;

    // ITM: strike well below spot. OTM rows must be dropped by the
    // client-side moneyness predicate; prob-OTM band drops the high-delta row.
    Mock::given(method("GET"))
        .and(path("/screener/covered-calls"))
        .and(query_param("min_roi", "0.5"))
        .and(query_param("bypass_cache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "opportunities": [
                opportunity("ITM-LOW", 105.0, 100.0, 0.30, 40.0),  // prob 70, kept
                opportunity("ITM-HIGH", 110.0, 100.0, 0.35, 90.0), // prob 65, kept
                opportunity("OTM", 95.0, 100.0, 0.25, 99.0),       // wrong bucket
                opportunity("DEEP", 140.0, 100.0, 0.92, 85.0)      // prob 8, out of band
            ],
            "from_cache": false,
            "market_closed": false,
            "is_last_trading_day": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ScanSession::from_config(&config_for(&server));
    {
        let filters = session.filters_mut();
        filters.roi.min_roi = Some(0.5);
        filters.options.moneyness = Moneyness::Itm;
        filters.probability.min_prob_otm = Some(50);
    }

    let outcome = session.scan(true).await.unwrap();
    let summary = match outcome {
        ScanOutcome::Applied(summary) => summary,
        ScanOutcome::Superseded => panic!("single scan cannot be superseded"),
    };
    assert_eq!(summary.total_received, 4);
    assert_eq!(summary.kept, 2);

    // Default sort is score descending
    let symbols: Vec<_> = session.results().iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(symbols, ["ITM-HIGH", "ITM-LOW"]);

    // Toggling a new field resets to descending on that field
    session.toggle_sort(SortField::Delta);
    let symbols: Vec<_> = session.results().iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(symbols, ["ITM-HIGH", "ITM-LOW"]);
    session.toggle_sort(SortField::Delta);
    let symbols: Vec<_> = session.results().iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(symbols, ["ITM-LOW", "ITM-HIGH"]);

    // Export reflects the current (ascending-delta) view
    let csv = session.export_csv();
    let lines: Vec<_> = csv.trim_end().lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("ITM-LOW,"));
    for line in &lines {
        assert_eq!(line.split(',').count(), 14);
    }
}

#[tokio::test]
async fn failed_scan_keeps_prior_view_and_surfaces_one_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/screener/covered-calls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "opportunities": [opportunity("GOOD", 100.0, 100.0, 0.3, 50.0)],
            "from_cache": false,
            "market_closed": false,
            "is_last_trading_day": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ScanSession::from_config(&config_for(&server));
    session.scan(false).await.unwrap();
    assert_eq!(session.results().len(), 1);

    // Backend goes away; the last-good view must survive
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/screener/covered-calls"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = session.scan(false).await.unwrap_err();
    assert_eq!(err.status_code(), 503);
    assert_eq!(session.results().len(), 1);
    assert_eq!(session.results()[0].symbol, "GOOD");
}

#[tokio::test]
async fn loading_a_preset_replaces_the_whole_state() {
    let server = MockServer::start().await;

    let mut saved = cce_screener::FilterState::default_scan();
    saved.options.moneyness = Moneyness::Otm;
    Mock::given(method("GET"))
        .and(path("/screener/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "p-1",
            "name": "otm defaults",
            "filters": saved,
            "created_at": "2025-09-01T14:30:00Z"
        }])))
        .mount(&server)
        .await;

    let mut session = ScanSession::from_config(&config_for(&server));
    // Local edits that the load must wipe, not merge
    session.filters_mut().stock.min_price = Some(999.0);
    session.filters_mut().greeks.min_delta = Some(0.99);

    session.load_preset("p-1").await.unwrap();
    assert_eq!(session.filters(), &saved);
}
