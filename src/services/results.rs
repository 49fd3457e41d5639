use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::models::result::{Item, ResultRecord};

/// Key-value store the detection worker writes results to.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Point lookup by prediction id. `Ok(None)` means no such record.
    async fn get(&self, prediction_id: &str) -> Result<Option<ResultRecord>, ResultStoreError>;
}

/// Result store backed by Redis strings holding enveloped JSON items.
pub struct RedisResultStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisResultStore {
    pub async fn connect(redis_url: &str, key_prefix: &str) -> Result<Self, ResultStoreError> {
        let client = redis::Client::open(redis_url).map_err(ResultStoreError::Redis)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(ResultStoreError::Redis)?;
        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
        })
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), ResultStoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(ResultStoreError::Redis)?;
        Ok(())
    }
}

/// Redis key a prediction's record is stored under.
pub fn result_key(key_prefix: &str, prediction_id: &str) -> String {
    format!("{key_prefix}{prediction_id}")
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn get(&self, prediction_id: &str) -> Result<Option<ResultRecord>, ResultStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(result_key(&self.key_prefix, prediction_id))
            .await
            .map_err(ResultStoreError::Redis)?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let item: Item = serde_json::from_str(&raw).map_err(ResultStoreError::Decode)?;
        ResultRecord::from_item(item)
            .map(Some)
            .map_err(ResultStoreError::Decode)
    }
}

/// Fetch a result record, folding misses and failures into `None`.
///
/// Both cases are logged; callers cannot tell them apart.
pub async fn fetch_result(store: &dyn ResultStore, prediction_id: &str) -> Option<ResultRecord> {
    match store.get(prediction_id).await {
        Ok(Some(record)) => {
            tracing::info!(
                prediction_id,
                chat_id = record.chat_id,
                labels = record.labels.len(),
                "Prediction summary fetched"
            );
            Some(record)
        }
        Ok(None) => {
            tracing::warn!(prediction_id, "No item found for prediction id");
            None
        }
        Err(e) => {
            tracing::error!(prediction_id, error = %e, "Error fetching prediction summary");
            None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResultStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed result record: {0}")]
    Decode(#[from] serde_json::Error),
}
