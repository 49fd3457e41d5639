use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// GET /metrics: relay counters in Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}

/// Register descriptions for the relay's metrics with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!("relay_messages_total", "Incoming chat messages by kind");
    metrics::describe_counter!("relay_uploads_failed_total", "Photo uploads that failed");
    metrics::describe_counter!("relay_jobs_enqueued_total", "Detection jobs sent to the queue");
    metrics::describe_counter!(
        "relay_jobs_failed_total",
        "Detection jobs that could not be queued after the user was notified"
    );
    metrics::describe_counter!(
        "relay_results_delivered_total",
        "Detection summaries sent back to users"
    );
    metrics::describe_counter!(
        "relay_results_missing_total",
        "Result polls whose prediction could not be fetched"
    );
    metrics::describe_histogram!(
        "relay_photo_processing_seconds",
        "Time from first acknowledgement to job submission for a photo"
    );
    metrics::describe_gauge!("relay_queue_depth", "Pending jobs observed by the last health check");
}
