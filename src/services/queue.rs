use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::models::job::JobDescriptor;

/// Destination of object-detection jobs.
#[async_trait]
pub trait JobSink: Send + Sync {
    async fn submit(&self, job: &JobDescriptor) -> Result<(), QueueError>;
}

/// Redis list consumed by the detection worker.
///
/// Holds one managed connection for the life of the process; it reconnects on its own
/// after a dropped link.
pub struct JobQueue {
    conn: ConnectionManager,
    key: String,
}

impl JobQueue {
    pub async fn connect(redis_url: &str, key: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(QueueError::Redis)?;
        Ok(Self {
            conn,
            key: key.to_string(),
        })
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Get the current queue depth (pending jobs).
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.conn.clone();
        let depth: u64 = conn.llen(&self.key).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }
}

#[async_trait]
impl JobSink for JobQueue {
    async fn submit(&self, job: &JobDescriptor) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(job).map_err(QueueError::Serialize)?;
        let depth: u64 = conn
            .lpush(&self.key, &payload)
            .await
            .map_err(QueueError::Redis)?;

        tracing::info!(
            photo_path = %job.photo_path,
            chat_id = job.chat_id,
            queue_depth = depth,
            "Job sent to queue"
        );
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
