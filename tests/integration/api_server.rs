//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, refresh behavior, health checks and metrics.


use chrono::{DateTime, Utc};
use serde_json::Value;
use stockwatch::core::runtime::RefreshTrigger;

use test_utils::TestApiServer;

fn parse_time(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .expect("RFC 3339 timestamp")
}

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "stockwatch");
}

#[tokio::test]
async fn status_before_and_after_manual_refresh() {
    let app = TestApiServer::new().await;

    let before: Value = app.server.get("/api/status").await.json();
    assert_eq!(before["status"], "running");
    assert!(before["last_update"].is_null());
    assert_eq!(before["total_stocks"], 0);
    assert_eq!(before["background_refresh_running"], false);
    assert!(before["market_open"].is_boolean());

    let started = Utc::now();
    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["successful"], 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let after: Value = app.server.get("/api/status").await.json();
    assert_eq!(after["total_stocks"], 3);
    assert!(parse_time(&after["last_update"]) >= started);
}

#[tokio::test]
async fn stocks_endpoint_sorts_by_change() {
    let app = TestApiServer::new().await;
    app.refresh.refresh(RefreshTrigger::Startup).await;

    let response = app
        .server
        .get("/api/stocks")
        .add_query_param("sort", "change")
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["total_stocks"], 3);
    assert_eq!(body["refresh_interval"], 60);
    let stocks = body["stocks"].as_array().expect("stocks array");
    let order: Vec<_> = stocks.iter().map(|s| s["symbol"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["AAA", "BBB", "CCC"]);

    let aaa = &stocks[0];
    assert_eq!(aaa["price"], 150.0);
    assert_eq!(aaa["change"], 2.0);
    assert_eq!(aaa["is_positive"], true);
    assert_eq!(aaa["volume"], 2_500_000);

    let bbb = &stocks[1];
    assert_eq!(bbb["price"], 0.0);
    assert_eq!(bbb["company_name"], "Bravo Inc");
    assert!(bbb["market_cap"].is_null());
}

#[tokio::test]
async fn stocks_endpoint_defaults_to_name_order() {
    let app = TestApiServer::new().await;
    app.refresh.refresh(RefreshTrigger::Startup).await;

    let body: Value = app.server.get("/api/stocks").await.json();
    let names: Vec<_> = body["stocks"]
        .as_array()
        .expect("stocks array")
        .iter()
        .map(|s| s["company_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha Corp", "Bravo Inc", "Charlie Ltd"]);
}

#[tokio::test]
async fn stocks_endpoint_is_empty_before_first_refresh() {
    let app = TestApiServer::new().await;
    let body: Value = app.server.get("/api/stocks").await.json();
    assert_eq!(body["total_stocks"], 0);
    assert!(body["last_update"].is_null());
    assert_eq!(body["stocks"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn failed_refresh_reports_error_payload() {
    let app = TestApiServer::broken().await;

    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("upstream client unavailable")));
    assert!(body["last_update"].is_null());

    let status: Value = app.server.get("/api/status").await.json();
    assert!(status["last_update"].is_null());
}

#[tokio::test]
async fn unknown_api_route_returns_json_404() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/unknown").await;
    assert_eq!(response.status_code(), 404);

    let body: Value = response.json();
    assert_eq!(body["error_code"], 404);
    assert_eq!(body["error_message"], "Page not found");
}

#[tokio::test]
async fn unknown_page_returns_html_404() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/no/such/page").await;
    assert_eq!(response.status_code(), 404);

    let html = response.text();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Error 404"));
    assert!(html.contains("Page not found"));
}

#[tokio::test]
async fn repeated_sort_parameter_uses_first_value() {
    let app = TestApiServer::new().await;
    app.refresh.refresh(RefreshTrigger::Startup).await;

    let response = app
        .server
        .get("/")
        .add_query_param("sort", "price")
        .add_query_param("sort", "name")
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("Sorted by: price"));

    let response = app
        .server
        .get("/api/stocks")
        .add_query_param("sort", "change")
        .add_query_param("sort", "name")
        .add_query_param("extra", "1")
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["stocks"][0]["symbol"], "AAA");
    assert_eq!(body["stocks"][2]["symbol"], "CCC");
}

#[tokio::test]
async fn dashboard_renders_quotes() {
    let app = TestApiServer::new().await;
    app.refresh.refresh(RefreshTrigger::Startup).await;

    let response = app.server.get("/").add_query_param("sort", "price").await;
    assert_eq!(response.status_code(), 200);

    let html = response.text();
    assert!(html.contains("Tech Stock Tracker"));
    assert!(html.contains("Alpha Corp"));
    assert!(html.contains("$150.00"));
    assert!(html.contains("Sorted by: price"));
    assert!(html.contains("2.5M"));
    assert_eq!(html.matches("<tr class=").count(), 3);
    assert!(html.contains("Bravo Inc"));
    assert!(html.contains("N/A"));
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    app.server.post("/api/refresh").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("api_requests_total{endpoint=\"/api/refresh\"} 1"));
    assert!(body.contains("refresh_cycles_total{outcome=\"success\"} 1"));
    assert!(body.contains("stock_data_success_total{symbol=\"AAA\"} 1"));
    assert!(body.contains("stock_data_failure_total{symbol=\"BBB\"} 1"));
}
