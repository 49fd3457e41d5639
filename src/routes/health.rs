use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub queue: ComponentHealth,
    pub results: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,
}

impl ComponentHealth {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            latency_ms: Some(latency_ms),
            depth: None,
        }
    }

    fn error() -> Self {
        Self {
            status: "error".to_string(),
            latency_ms: None,
            depth: None,
        }
    }

    fn unchecked() -> Self {
        Self {
            status: "unchecked".to_string(),
            latency_ms: None,
            depth: None,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status != "error"
    }
}

/// GET /: liveness acknowledgement, independent of downstream services.
pub async fn index() -> &'static str {
    "Ok"
}

/// GET /health: dependency status of the queue and result store.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (queue_check, results_check) = match &state.probes {
        Some(probes) => {
            let queue_start = std::time::Instant::now();
            let queue_check = match probes.queue.health_check().await {
                Ok(()) => {
                    let mut check = ComponentHealth::ok(queue_start.elapsed().as_millis() as u64);
                    check.depth = probes.queue.queue_depth().await.ok();
                    if let Some(depth) = check.depth {
                        metrics::gauge!("relay_queue_depth").set(depth as f64);
                    }
                    check
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Queue health check failed");
                    ComponentHealth::error()
                }
            };

            let results_start = std::time::Instant::now();
            let results_check = match probes.results.health_check().await {
                Ok(()) => ComponentHealth::ok(results_start.elapsed().as_millis() as u64),
                Err(e) => {
                    tracing::warn!(error = %e, "Result store health check failed");
                    ComponentHealth::error()
                }
            };

            (queue_check, results_check)
        }
        None => (ComponentHealth::unchecked(), ComponentHealth::unchecked()),
    };

    let all_healthy = queue_check.is_healthy() && results_check.is_healthy();
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            queue: queue_check,
            results: results_check,
        },
    };

    (status_code, Json(response))
}
