pub mod middleware;

pub use middleware::MetricsMiddleware;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::{Arc, OnceLock};

use crate::config::AppConfig;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Process-wide Prometheus recorder and the counters this service emits
#[derive(Clone)]
pub struct AppMetrics {
    prometheus_handle: Arc<PrometheusHandle>,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self::with_config(None)
    }

    /// The first call installs the global recorder; later calls share it
    pub fn with_config(config: Option<&AppConfig>) -> Self {
        let handle = PROMETHEUS_HANDLE.get_or_init(|| match Self::install(config) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Prometheus recorder, metrics are disabled");
                PrometheusBuilder::new().build_recorder().handle()
            }
        });

        Self {
            prometheus_handle: Arc::new(handle.clone()),
        }
    }

    fn install(config: Option<&AppConfig>) -> Result<PrometheusHandle, BuildError> {
        let builder = PrometheusBuilder::new();

        let builder = if let Some(cfg) = config {
            builder
                .add_global_label("service", cfg.app.name.clone())
                .add_global_label("environment", cfg.app.environment.clone())
        } else {
            builder
        };

        let handle = builder
            .set_buckets_for_metric(
                Matcher::Full("http_requests_duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0],
            )?
            .install_recorder()?;

        Self::describe_metrics();

        Ok(handle)
    }

    fn describe_metrics() {
        // HTTP metrics
        describe_counter!("http_requests_total", "Total number of HTTP requests");
        describe_histogram!(
            "http_requests_duration_seconds",
            "HTTP request duration in seconds"
        );
        describe_gauge!(
            "http_requests_in_flight",
            "Number of HTTP requests currently being processed"
        );

        // Auth metrics
        describe_counter!("auth_login_attempts_total", "Total number of login attempts");
        describe_counter!("auth_registrations_total", "Registration attempts by outcome");
        describe_gauge!("auth_sessions_active", "Number of live sessions in the registry");

        // Security metrics
        describe_counter!(
            "security_suspicious_input_total",
            "Request fields rejected by the input guard"
        );
        describe_counter!(
            "security_rate_limited_total",
            "Requests rejected by a rate limiter"
        );
    }

    // HTTP metrics
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            "http_requests_duration_seconds",
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(duration_secs);
    }

    pub fn http_request_start(&self) {
        gauge!("http_requests_in_flight").increment(1.0);
    }

    pub fn http_request_end(&self) {
        gauge!("http_requests_in_flight").decrement(1.0);
    }

    // Auth metrics
    pub fn record_login_attempt(&self, success: bool) {
        let status = if success { "true" } else { "false" };
        counter!("auth_login_attempts_total", "success" => status.to_string()).increment(1);
    }

    /// `outcome` is one of `created`, `conflict` or `error`
    pub fn record_registration(&self, outcome: &'static str) {
        counter!("auth_registrations_total", "outcome" => outcome).increment(1);
    }

    pub fn set_active_sessions(&self, count: usize) {
        gauge!("auth_sessions_active").set(count as f64);
    }

    // Security metrics
    pub fn record_suspicious_input(&self, field: &'static str) {
        counter!("security_suspicious_input_total", "field" => field).increment(1);
    }

    pub fn record_rate_limited(&self, limiter: &'static str) {
        counter!("security_rate_limited_total", "limiter" => limiter).increment(1);
    }

    // Prometheus export
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}
