use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Duration;

/// Prometheus instruments for resource store calls.
#[derive(Clone)]
pub struct ResourceStoreMetrics {
    registry: Registry,
    queries_total: IntCounterVec,
    query_duration_seconds: HistogramVec,
}

impl ResourceStoreMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Register the instruments on an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let queries_total = IntCounterVec::new(
            Opts::new(
                "resource_store_queries_total",
                "Resource store calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        let query_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "resource_store_query_duration_seconds",
                "Resource store call latency",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;

        registry.register(Box::new(queries_total.clone()))?;
        registry.register(Box::new(query_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            queries_total,
            query_duration_seconds,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn observe(&self, operation: &str, success: bool, elapsed: Duration) {
        let outcome = if success { "ok" } else { "error" };
        self.queries_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.query_duration_seconds
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    pub fn query_count(&self, operation: &str, success: bool) -> u64 {
        let outcome = if success { "ok" } else { "error" };
        self.queries_total
            .with_label_values(&[operation, outcome])
            .get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_operation_and_outcome() {
        let metrics = ResourceStoreMetrics::new().unwrap();
        metrics.observe("get_all_api_resources", true, Duration::from_millis(2));
        metrics.observe("get_all_api_resources", false, Duration::from_millis(3));
        metrics.observe("get_all_api_resources", true, Duration::from_millis(1));

        assert_eq!(metrics.query_count("get_all_api_resources", true), 2);
        assert_eq!(metrics.query_count("get_all_api_resources", false), 1);

        let text = String::from_utf8(crate::encode_prometheus_text(metrics.registry()).unwrap())
            .unwrap();
        assert!(text.contains("resource_store_queries_total"));
    }
}
