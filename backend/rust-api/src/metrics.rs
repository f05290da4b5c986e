use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quizhub_http_requests_total",
        "Requests served, by route and status",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "quizhub_http_request_duration_seconds",
        "Request latency per route",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quizhub_store_operations_total",
        "Store operations, by collection and result",
        &["operation", "collection", "status"]
    )
    .unwrap();

    pub static ref STORE_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "quizhub_store_operation_duration_seconds",
        "Store operation latency per collection",
        &["operation", "collection"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    pub static ref REMOTE_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quizhub_remote_calls_total",
        "Calls made to peer services by outcome",
        &["service", "outcome"]
    )
    .unwrap();

    pub static ref CASCADE_STEPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quizhub_cascade_steps_total",
        "Child removals attempted by cascading deletes",
        &["parent", "outcome"]
    )
    .unwrap();
}

/// Prometheus text exposition of the default registry.
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("Metrics are not UTF-8: {}", e)))
}

/// Times a store operation and counts it under `success` or `error`.
pub async fn track_store_operation<F, T>(operation: &str, collection: &str, future: F) -> anyhow::Result<T>
where
    F: std::future::Future<Output = anyhow::Result<T>>,
{
    let timer = STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation, collection])
        .start_timer();
    let result = future.await;
    timer.observe_duration();

    let status = if result.is_ok() { "success" } else { "error" };
    STORE_OPERATIONS_TOTAL
        .with_label_values(&[operation, collection, status])
        .inc();
    result
}

pub fn record_cascade_step(parent: &str, ok: bool) {
    let outcome = if ok { "completed" } else { "failed" };
    CASCADE_STEPS_TOTAL
        .with_label_values(&[parent, outcome])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_request_and_remote_counters() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/categories", "200"])
            .inc();
        REMOTE_CALLS_TOTAL
            .with_label_values(&["quiz-service", "ok"])
            .inc();

        let output = render_metrics().unwrap();
        assert!(output.contains("http_requests_total"));
        assert!(output.contains("quizhub_remote_calls_total"));
    }

    #[tokio::test]
    async fn store_operation_is_counted_by_status() {
        let before = STORE_OPERATIONS_TOTAL
            .with_label_values(&["find", "metrics_sample", "error"])
            .get();

        let result: Result<(), _> =
            track_store_operation("find", "metrics_sample", async { Err(anyhow::anyhow!("boom")) }).await;

        assert!(result.is_err());
        assert_eq!(
            STORE_OPERATIONS_TOTAL
                .with_label_values(&["find", "metrics_sample", "error"])
                .get(),
            before + 1
        );
    }

    #[test]
    fn cascade_steps_split_by_outcome() {
        record_cascade_step("metrics_sample", true);
        record_cascade_step("metrics_sample", false);
        record_cascade_step("metrics_sample", false);

        assert!(
            CASCADE_STEPS_TOTAL
                .with_label_values(&["metrics_sample", "failed"])
                .get()
                >= 2
        );
    }
}
