//! Prometheus metrics for the HTTP surface and the refresh pipeline

use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec,
    IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    // HTTP
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub api_requests_total: IntCounterVec,

    // Fetching
    pub stock_fetches_total: IntCounterVec,
    pub stock_fetch_duration_seconds: Histogram,
    pub provider_request_duration_seconds: HistogramVec,
    pub stock_data_success_total: IntCounterVec,
    pub stock_data_failure_total: IntCounterVec,
    pub stock_price_current_usd: GaugeVec,
    pub stock_change_percent: Histogram,
    pub stock_volume: Histogram,
    pub errors_total: IntCounterVec,

    // Refresh loop
    pub refresh_cycles_total: IntCounterVec,
    pub background_tasks_active: IntGauge,
    pub market_status: IntGauge,
    pub last_refresh_timestamp_seconds: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "Duration of HTTP requests",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;
        let api_requests_total = IntCounterVec::new(
            Opts::new("api_requests_total", "Total number of API requests by endpoint"),
            &["endpoint"],
        )?;

        let stock_fetches_total = IntCounterVec::new(
            Opts::new("stock_fetches_total", "Total number of per-symbol stock fetches"),
            &["outcome"],
        )?;
        let stock_fetch_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "stock_fetch_duration_seconds",
                "Duration of a full fetch of all symbols",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        let provider_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "provider_request_duration_seconds",
                "Duration of market data provider calls",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["symbol"],
        )?;
        let stock_data_success_total = IntCounterVec::new(
            Opts::new("stock_data_success_total", "Successful stock data retrievals by symbol"),
            &["symbol"],
        )?;
        let stock_data_failure_total = IntCounterVec::new(
            Opts::new("stock_data_failure_total", "Failed stock data retrievals by symbol"),
            &["symbol"],
        )?;
        let stock_price_current_usd = GaugeVec::new(
            Opts::new("stock_price_current_usd", "Current stock price in USD"),
            &["symbol", "company"],
        )?;
        let stock_change_percent = Histogram::with_opts(
            HistogramOpts::new("stock_change_percent", "Distribution of daily change percent")
                .buckets(vec![-10.0, -5.0, -2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 5.0, 10.0]),
        )?;
        let stock_volume = Histogram::with_opts(
            HistogramOpts::new("stock_volume", "Distribution of traded volume (shares)")
                .buckets(prometheus::exponential_buckets(100_000.0, 4.0, 8)?),
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("errors_total", "Total number of errors by kind"),
            &["kind"],
        )?;

        let refresh_cycles_total = IntCounterVec::new(
            Opts::new("refresh_cycles_total", "Refresh cycles by outcome"),
            &["outcome"],
        )?;
        let background_tasks_active =
            IntGauge::new("background_tasks_active", "Number of active background tasks")?;
        let market_status =
            IntGauge::new("market_status", "Market open status (1=open, 0=closed)")?;
        let last_refresh_timestamp_seconds = Gauge::new(
            "last_refresh_timestamp_seconds",
            "Unix time of the last completed refresh cycle",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(api_requests_total.clone()))?;
        registry.register(Box::new(stock_fetches_total.clone()))?;
        registry.register(Box::new(stock_fetch_duration_seconds.clone()))?;
        registry.register(Box::new(provider_request_duration_seconds.clone()))?;
        registry.register(Box::new(stock_data_success_total.clone()))?;
        registry.register(Box::new(stock_data_failure_total.clone()))?;
        registry.register(Box::new(stock_price_current_usd.clone()))?;
        registry.register(Box::new(stock_change_percent.clone()))?;
        registry.register(Box::new(stock_volume.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(refresh_cycles_total.clone()))?;
        registry.register(Box::new(background_tasks_active.clone()))?;
        registry.register(Box::new(market_status.clone()))?;
        registry.register(Box::new(last_refresh_timestamp_seconds.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            api_requests_total,
            stock_fetches_total,
            stock_fetch_duration_seconds,
            provider_request_duration_seconds,
            stock_data_success_total,
            stock_data_failure_total,
            stock_price_current_usd,
            stock_change_percent,
            stock_volume,
            errors_total,
            refresh_cycles_total,
            background_tasks_active,
            market_status,
            last_refresh_timestamp_seconds,
        })
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
