use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

pub mod health;
pub mod metrics;
pub mod results;
pub mod webhook;

/// Application routes. The webhook is served under `/{token}/`; requests whose path
/// segment is not the configured token get a 404.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/results/", get(results::deliver_results))
        .route("/loadTest/", post(webhook::load_test))
        .route("/{secret}/", post(webhook::telegram_webhook))
        .with_state(state)
}
