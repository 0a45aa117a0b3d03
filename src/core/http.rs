//! HTTP endpoint server using Axum

use axum::{
    extract::{MatchedPath, Query, Request, State},
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::config::AppConfig;
use crate::core::market_hours::is_market_open;
use crate::core::presenter::{view, SortKey};
use crate::core::runtime::{RefreshService, RefreshTrigger};
use crate::core::scheduler::RefreshScheduler;
use crate::metrics::Metrics;
use crate::models::StockView;
use crate::utils::{format_currency, format_volume};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub config: Arc<AppConfig>,
    pub refresh: Arc<RefreshService>,
    pub scheduler: Option<Arc<RefreshScheduler>>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Query string as raw pairs, so repeated keys never reject the request.
/// The first `sort` wins.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct SortQuery(Vec<(String, String)>);

impl SortQuery {
    fn raw(&self) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == "sort")
            .map(|(_, value)| value.as_str())
            .unwrap_or("name")
    }
}

#[derive(Debug, Serialize)]
struct StocksResponse {
    stocks: Vec<StockView>,
    last_update: Option<DateTime<Utc>>,
    refresh_interval: u64,
    total_stocks: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "stockwatch"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .api_requests_total
        .with_label_values(&[endpoint.as_str()])
        .inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        state.metrics.errors_total.with_label_values(&["http"]).inc();
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

async fn background_refresh_running(state: &AppState) -> bool {
    match state.scheduler {
        Some(ref scheduler) => scheduler.is_running().await,
        None => false,
    }
}

/// Dashboard page
async fn index(State(state): State<AppState>, Query(params): Query<SortQuery>) -> Html<String> {
    let snapshot = state.refresh.store().read().await;
    let stocks = view(&snapshot, SortKey::from(params.raw()));
    let market_open = is_market_open();
    state.metrics.market_status.set(i64::from(market_open));

    Html(render_index(
        &stocks,
        snapshot.last_update,
        params.raw(),
        market_open,
        &state.config,
    ))
}

/// Current quotes as JSON
async fn api_stocks(
    State(state): State<AppState>,
    Query(params): Query<SortQuery>,
) -> Json<StocksResponse> {
    let snapshot = state.refresh.store().read().await;
    Json(StocksResponse {
        stocks: view(&snapshot, SortKey::from(params.raw())),
        last_update: snapshot.last_update,
        refresh_interval: state.config.refresh_interval_seconds,
        total_stocks: snapshot.len(),
    })
}

/// Run one refresh cycle now
async fn api_refresh(State(state): State<AppState>) -> Json<Value> {
    let outcome = state.refresh.refresh(RefreshTrigger::Manual).await;

    match outcome.snapshot {
        Some(ref snapshot) if outcome.success => Json(json!({
            "success": true,
            "data": view(snapshot, SortKey::Natural),
            "last_update": snapshot.last_update,
            "successful": outcome.succeeded,
            "total": snapshot.len(),
        })),
        _ => {
            // Report the last good refresh time, if any, alongside the error
            let previous = state.refresh.store().read().await;
            Json(json!({
                "success": false,
                "error": outcome.error.unwrap_or_else(|| "refresh failed".to_string()),
                "last_update": previous.last_update,
            }))
        }
    }
}

async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.refresh.store().read().await;
    let market_open = is_market_open();
    state.metrics.market_status.set(i64::from(market_open));

    Json(json!({
        "status": "running",
        "last_update": snapshot.last_update,
        "total_stocks": snapshot.len(),
        "refresh_interval": state.config.refresh_interval_seconds,
        "background_refresh_running": background_refresh_running(&state).await,
        "market_open": market_open,
    }))
}

/// JSON for API clients, an HTML page for browsers
async fn not_found(method: Method, uri: Uri) -> Response {
    let path = uri.path();
    if method == Method::GET && !path.starts_with("/api/") {
        return (StatusCode::NOT_FOUND, Html(render_error_page(404, "Page not found"))).into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error_code": 404,
            "error_message": "Page not found"
        })),
    )
        .into_response()
}

pub fn render_error_page(code: u16, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Error {code}</title></head>\n<body>\n\
         <h1>Error {code}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to the dashboard</a></p>\n</body>\n</html>\n",
        code = code,
        message = escape_html(message),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_index(
    stocks: &[StockView],
    last_update: Option<DateTime<Utc>>,
    current_sort: &str,
    market_open: bool,
    config: &AppConfig,
) -> String {
    let precision = config.price_precision;
    let rows: String = stocks
        .iter()
        .map(|stock| {
            let class = if stock.is_positive {
                "positive"
            } else if stock.is_negative {
                "negative"
            } else {
                "neutral"
            };
            let market_cap = stock
                .market_cap
                .map(|cap| format_currency(cap, precision))
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "<tr class=\"{class}\"><td>{symbol}</td><td>{name}</td><td>${price:.p$}</td>\
                 <td>{change:+.p$}</td><td>{pct:+.p$}%</td><td title=\"{vol_m:.vp$}M\">{volume}</td><td>{cap}</td></tr>\n",
                class = class,
                symbol = escape_html(&stock.symbol),
                name = escape_html(&stock.company_name),
                price = stock.price,
                change = stock.change,
                pct = stock.change_percent,
                vol_m = stock.volume_millions,
                volume = format_volume(stock.volume),
                cap = market_cap,
                p = precision,
                vp = config.volume_precision,
            )
        })
        .collect();

    let updated = last_update
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Tech Stock Tracker</title></head>\n<body>\n\
         <h1>Tech Stock Tracker</h1>\n\
         <p>Market: {market} | Last update: {updated} | Sorted by: {sort} | Stocks: {total} | Refresh every {interval}s</p>\n\
         <p><a href=\"/?sort=name\">Name</a> | <a href=\"/?sort=price\">Price</a> | <a href=\"/?sort=change\">Change</a></p>\n\
         <table>\n<tr><th>Symbol</th><th>Company</th><th>Price</th><th>Change</th><th>Change %</th><th>Volume</th><th>Market Cap</th></tr>\n\
         {rows}</table>\n</body>\n</html>\n",
        market = if market_open { "open" } else { "closed" },
        updated = updated,
        sort = escape_html(current_sort),
        total = stocks.len(),
        interval = config.refresh_interval_seconds,
        rows = rows,
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/stocks", get(api_stocks))
        .route("/api/refresh", post(api_refresh))
        .route("/api/status", get(api_status))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let port = state.config.port;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
