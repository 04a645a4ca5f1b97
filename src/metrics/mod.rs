//! Prometheus metrics for the triage service.
//!
//! Metrics live in a process-wide registry and are rendered in the text
//! exposition format by [`gather_metrics`].
//!
//! # Example
//! ```no_run
//! use emergency_triage::metrics::CLASSIFICATIONS_TOTAL;
//!
//! CLASSIFICATIONS_TOTAL.with_label_values(&["high"]).inc();
//! ```

mod middleware;

pub use middleware::track_metrics;

use lazy_static::lazy_static;
use prometheus::{
    core::Collector, Counter, CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};

const NAMESPACE: &str = "emergency_triage";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Descriptions triaged, by resulting tier
    ///
    /// Labels: priority
    pub static ref CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("classifications_total", "Total number of descriptions classified")
            .namespace(NAMESPACE),
        &["priority"]
    ).expect("Failed to create CLASSIFICATIONS_TOTAL metric");

    /// Classifications that could not produce a tier
    pub static ref CLASSIFICATION_FAILURES_TOTAL: Counter = Counter::with_opts(
        Opts::new("classification_failures_total", "Total number of failed classifications")
            .namespace(NAMESPACE)
    ).expect("Failed to create CLASSIFICATION_FAILURES_TOTAL metric");

    /// Time spent in the classifier
    pub static ref CLASSIFICATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "classification_duration_seconds",
            "Classification duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1]),
    ).expect("Failed to create CLASSIFICATION_DURATION_SECONDS metric");

    /// Emergencies reported, by priority
    ///
    /// Labels: priority
    pub static ref EMERGENCIES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("emergencies_total", "Total number of emergencies reported")
            .namespace(NAMESPACE),
        &["priority"]
    ).expect("Failed to create EMERGENCIES_TOTAL metric");
}

fn register<C: Collector + Clone + 'static>(collector: &C) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(Box::new(collector.clone())) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(&*HTTP_REQUESTS_TOTAL)?;
    register(&*HTTP_REQUEST_DURATION_SECONDS)?;
    register(&*CLASSIFICATIONS_TOTAL)?;
    register(&*CLASSIFICATION_FAILURES_TOTAL)?;
    register(&*CLASSIFICATION_DURATION_SECONDS)?;
    register(&*EMERGENCIES_TOTAL)?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Render the registry in the Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
