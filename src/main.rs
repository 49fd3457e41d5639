use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use detection_relay::app_state::{AppState, HealthProbes};
use detection_relay::config::AppConfig;
use detection_relay::routes;
use detection_relay::services::{
    queue::JobQueue,
    results::RedisResultStore,
    router::MessageRouter,
    storage::S3Storage,
    telegram::{AnimationSource, TelegramClient},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    let token = config.load_telegram_token()?;

    tracing::info!("Initializing detection-relay server");

    let prometheus_handle = Arc::new(PrometheusBuilder::new().install_recorder()?);
    routes::metrics::describe_metrics();

    tracing::info!(api_base = %config.telegram_api_base, "Initializing Telegram client");
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_base,
        &token,
        &config.download_dir,
    ));

    tracing::info!(bucket = %config.bucket_name, "Initializing S3 storage client");
    let storage = Arc::new(S3Storage::new(
        &config.bucket_name,
        &config.s3_region,
        config.s3_endpoint.as_deref(),
        config.s3_access_key.as_deref(),
        config.s3_secret_key.as_deref(),
    )?);

    tracing::info!(key = %config.queue_key, "Connecting to Redis job queue");
    let queue = Arc::new(JobQueue::connect(&config.queue_url, &config.queue_key).await?);

    tracing::info!(prefix = %config.results_key_prefix, "Connecting to Redis result store");
    let results = Arc::new(
        RedisResultStore::connect(config.results_url(), &config.results_key_prefix).await?,
    );

    if config.register_webhook {
        telegram
            .register_webhook(
                &config.telegram_app_url,
                config.telegram_certificate.as_deref(),
            )
            .await?;
    } else {
        tracing::warn!("Webhook registration skipped (REGISTER_WEBHOOK=false)");
    }

    let router = MessageRouter::new(
        telegram.clone(),
        storage,
        queue.clone(),
        AnimationSource::from_config(&config.loading_animation),
    )
    .with_quoted_replies(config.quote_replies);

    let state = AppState::new(router, telegram, results.clone(), &token)
        .with_health_probes(HealthProbes { queue, results });

    let app = routes::app_router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1 MB limit

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
