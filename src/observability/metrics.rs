use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for the account ledger.
#[derive(Debug, Clone)]
pub struct Metrics {
    initialized: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self { initialized: true }
    }

    pub fn record_transaction(&self, transaction_type: &str, result: &str) {
        counter!("ledger_transactions_total", "type" => transaction_type.to_string(), "result" => result.to_string()).increment(1);
    }

    pub fn record_transaction_query(&self) {
        counter!("ledger_transaction_queries_total").increment(1);
    }

    pub fn record_engine_latency(&self, operation: &str, duration_ms: f64) {
        histogram!("ledger_engine_duration_ms", "operation" => operation.to_string()).record(duration_ms);
    }

    pub fn record_lock_acquired(&self, wait_ms: f64) {
        counter!("ledger_lock_acquired_total").increment(1);
        histogram!("ledger_lock_wait_duration_ms").record(wait_ms);
    }

    pub fn record_lock_busy(&self) {
        counter!("ledger_lock_busy_total").increment(1);
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_ms: f64) {
        counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string(), "status" => status.to_string()).increment(1);
        histogram!("http_request_duration_ms", "method" => method.to_string(), "path" => path.to_string()).record(duration_ms);
    }
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the metrics system and returns the Prometheus handle.
pub fn init_metrics() -> PrometheusHandle {
    let handle = METRICS_HANDLE.get_or_init(|| {
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        describe_metrics();
        handle
    });

    METRICS.get_or_init(Metrics::new);

    handle.clone()
}

/// Describes all metrics for Prometheus.
fn describe_metrics() {
    describe_counter!("ledger_transactions_total", Unit::Count, "Ledger entries written, by type and result");
    describe_counter!("ledger_transaction_queries_total", Unit::Count, "Transaction lookups by public id");
    describe_histogram!("ledger_engine_duration_ms", Unit::Milliseconds, "Balance engine latency in milliseconds");

    describe_counter!("ledger_lock_acquired_total", Unit::Count, "Account locks acquired");
    describe_counter!("ledger_lock_busy_total", Unit::Count, "Lock acquisitions rejected as busy");
    describe_histogram!("ledger_lock_wait_duration_ms", Unit::Milliseconds, "Time spent waiting for account locks");

    describe_counter!("http_requests_total", Unit::Count, "Total HTTP requests");
    describe_histogram!("http_request_duration_ms", Unit::Milliseconds, "HTTP request latency in milliseconds");
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_timer() {
        let timer = LatencyTimer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 10.0);
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(metrics.initialized);
    }
}
