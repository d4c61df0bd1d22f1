//! Observability metrics for routing operations.
//!
//! Prometheus-compatible counters and histograms for:
//! - Routes by tier and route type
//! - Route latency
//! - Tier 3 discovery requests by status
//! - Discovery token usage

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

const TIER_LABEL: &str = "tier";
const ROUTE_TYPE_LABEL: &str = "route_type";
const STATUS_LABEL: &str = "status";
const DIRECTION_LABEL: &str = "direction";

/// Metrics collector for the routing pipeline.
pub struct MetricsCollector {
    registry: Registry,

    /// Completed routes by tier and route type.
    routes_total: CounterVec,

    /// Route latency in milliseconds, by tier.
    route_duration_ms: HistogramVec,

    /// Tier 3 provider invocations by status (success/failure).
    discovery_requests_total: CounterVec,

    /// Discovery tokens by direction (input/output).
    discovery_tokens_total: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let registry = Registry::new();

        let routes_opts = Opts::new("skillroute_routes_total", "Total routed queries");
        let routes_total = CounterVec::new(routes_opts, &[TIER_LABEL, ROUTE_TYPE_LABEL])
            .expect("Failed to create routes counter");
        registry
            .register(Box::new(routes_total.clone()))
            .expect("Failed to register routes counter");

        let duration_opts = HistogramOpts::new(
            "skillroute_route_duration_ms",
            "Route latency in milliseconds",
        )
        .buckets(vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 15000.0]);
        let route_duration_ms = HistogramVec::new(duration_opts, &[TIER_LABEL])
            .expect("Failed to create duration histogram");
        registry
            .register(Box::new(route_duration_ms.clone()))
            .expect("Failed to register duration histogram");

        let discovery_opts = Opts::new(
            "skillroute_discovery_requests_total",
            "Total LLM discovery invocations",
        );
        let discovery_requests_total = CounterVec::new(discovery_opts, &[STATUS_LABEL])
            .expect("Failed to create discovery counter");
        registry
            .register(Box::new(discovery_requests_total.clone()))
            .expect("Failed to register discovery counter");

        let tokens_opts = Opts::new(
            "skillroute_discovery_tokens_total",
            "Total discovery tokens processed",
        );
        let discovery_tokens_total = CounterVec::new(tokens_opts, &[DIRECTION_LABEL])
            .expect("Failed to create tokens counter");
        registry
            .register(Box::new(discovery_tokens_total.clone()))
            .expect("Failed to register tokens counter");

        Self {
            registry,
            routes_total,
            route_duration_ms,
            discovery_requests_total,
            discovery_tokens_total,
        }
    }

    pub fn record_route(&self, tier: u8, route_type: &str) {
        self.routes_total
            .with_label_values(&[&tier.to_string(), route_type])
            .inc();
    }

    pub fn observe_route_duration(&self, tier: u8, duration_ms: f64) {
        self.route_duration_ms
            .with_label_values(&[&tier.to_string()])
            .observe(duration_ms);
    }

    pub fn record_discovery(&self, status: &str) {
        self.discovery_requests_total
            .with_label_values(&[status])
            .inc();
    }

    pub fn record_discovery_tokens(&self, input_tokens: u64, output_tokens: u64) {
        self.discovery_tokens_total
            .with_label_values(&["input"])
            .inc_by(input_tokens as f64);
        self.discovery_tokens_total
            .with_label_values(&["output"])
            .inc_by(output_tokens as f64);
    }

    /// Get Prometheus-formatted metrics.
    pub fn prometheus_metrics(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics instance
static METRICS: std::sync::OnceLock<MetricsCollector> = std::sync::OnceLock::new();

/// Get the global metrics collector
pub fn global() -> &'static MetricsCollector {
    METRICS.get_or_init(MetricsCollector::new)
}

/// Record a completed route to global metrics
pub fn record_route(tier: u8, route_type: &str) {
    global().record_route(tier, route_type);
}

/// Record route latency to global metrics
pub fn observe_route_duration(tier: u8, duration_ms: f64) {
    global().observe_route_duration(tier, duration_ms);
}

/// Record a discovery invocation to global metrics
pub fn record_discovery(status: &str) {
    global().record_discovery(status);
}

/// Record discovery token usage to global metrics
pub fn record_discovery_tokens(input_tokens: u64, output_tokens: u64) {
    global().record_discovery_tokens(input_tokens, output_tokens);
}

/// Get Prometheus metrics from the global collector
pub fn prometheus() -> String {
    global().prometheus_metrics()
}
