use std::sync::Arc;

use crate::services::{
    queue::JobQueue, results::RedisResultStore, results::ResultStore, router::MessageRouter,
    telegram::Messenger,
};

/// Shared application state passed to all route handlers.
///
/// Every client is built once at startup and shared for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MessageRouter>,
    pub messenger: Arc<dyn Messenger>,
    pub results: Arc<dyn ResultStore>,
    /// Path segment the webhook is served under (the bot token).
    pub webhook_secret: Arc<str>,
    /// Concrete Redis clients probed by `/health`; absent in tests.
    pub probes: Option<HealthProbes>,
}

#[derive(Clone)]
pub struct HealthProbes {
    pub queue: Arc<JobQueue>,
    pub results: Arc<RedisResultStore>,
}

impl AppState {
    pub fn new(
        router: MessageRouter,
        messenger: Arc<dyn Messenger>,
        results: Arc<dyn ResultStore>,
        webhook_secret: &str,
    ) -> Self {
        Self {
            router: Arc::new(router),
            messenger,
            results,
            webhook_secret: Arc::from(webhook_secret),
            probes: None,
        }
    }

    pub fn with_health_probes(mut self, probes: HealthProbes) -> Self {
        self.probes = Some(probes);
        self
    }
}
