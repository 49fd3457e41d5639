//! Per-message routing: photo jobs, text echo, and the unsupported-type notice.

use std::sync::Arc;
use std::time::Instant;
use strum::{Display, IntoStaticStr};

use crate::models::job::{photo_storage_key, JobDescriptor};
use crate::models::message::{ChatId, IncomingMessage, PhotoSize};
use crate::services::queue::JobSink;
use crate::services::storage::{BlobStore, StorageError};
use crate::services::telegram::{AnimationSource, Messenger, TelegramError};

pub const PHOTO_HINT: &str = "Tip: Send a photo!";
pub const PROCESSING_TEXT: &str = "Your image is being processed.\nPlease wait...";
pub const UPLOAD_FAILED_TEXT: &str = "Failed to upload image to S3.";
pub const UNSUPPORTED_TEXT: &str = "Unsupported message type.\nTip: Send a photo!";

/// Reply sent back for a plain text message.
pub fn echo_text(text: &str) -> String {
    format!("Your original message: {text}\n{PHOTO_HINT}")
}

/// What the router did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RouteOutcome {
    /// Photo uploaded and its job enqueued.
    Queued,
    /// Photo uploaded but the enqueue failed after the user was told processing started.
    QueueFailed,
    UploadFailed,
    Echoed,
    Unsupported,
}

pub struct MessageRouter {
    messenger: Arc<dyn Messenger>,
    storage: Arc<dyn BlobStore>,
    queue: Arc<dyn JobSink>,
    loading_animation: AnimationSource,
    quote_replies: bool,
}

impl MessageRouter {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        storage: Arc<dyn BlobStore>,
        queue: Arc<dyn JobSink>,
        loading_animation: AnimationSource,
    ) -> Self {
        Self {
            messenger,
            storage,
            queue,
            loading_animation,
            quote_replies: false,
        }
    }

    /// Quote the user's message in text and unsupported-type replies.
    pub fn with_quoted_replies(mut self, enabled: bool) -> Self {
        self.quote_replies = enabled;
        self
    }

    /// Handle one incoming message. Photo beats text; anything else is unsupported.
    ///
    /// Messaging-platform failures abort the handling and are returned. Storage and
    /// queue failures are handled here.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Result<RouteOutcome, TelegramError> {
        let kind = msg.kind();
        tracing::info!(
            chat_id = msg.chat_id(),
            message_id = ?msg.message_id,
            kind = %kind,
            "Incoming message"
        );
        metrics::counter!("relay_messages_total", "kind" => <&'static str>::from(kind)).increment(1);

        if let Some(photo) = msg.largest_photo() {
            return self.handle_photo(msg.chat_id(), photo).await;
        }

        if let Some(text) = msg.text.as_deref() {
            self.reply(msg, &echo_text(text)).await?;
            return Ok(RouteOutcome::Echoed);
        }

        self.reply(msg, UNSUPPORTED_TEXT).await?;
        Ok(RouteOutcome::Unsupported)
    }

    async fn handle_photo(
        &self,
        chat_id: ChatId,
        photo: &PhotoSize,
    ) -> Result<RouteOutcome, TelegramError> {
        let started = Instant::now();

        let loading = self
            .messenger
            .send_animation(chat_id, &self.loading_animation)
            .await?;

        let local_path = self.messenger.download_photo(photo).await?;

        let upload = match photo_storage_key(&local_path) {
            Some(key) => self
                .storage
                .upload_file(&local_path, &key)
                .await
                .map(|()| key),
            None => Err(StorageError::MissingFileName(local_path.clone())),
        };

        let key = match upload {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(
                    chat_id,
                    path = %local_path.display(),
                    error = %e,
                    "Failed to upload photo"
                );
                metrics::counter!("relay_uploads_failed_total").increment(1);
                self.messenger
                    .delete_message(chat_id, loading.message_id)
                    .await?;
                self.messenger.send_text(chat_id, UPLOAD_FAILED_TEXT).await?;
                return Ok(RouteOutcome::UploadFailed);
            }
        };

        self.messenger.send_text(chat_id, PROCESSING_TEXT).await?;

        // The user has already been told processing started; an enqueue failure is only logged.
        let job = JobDescriptor::new(key, chat_id);
        let outcome = match self.queue.submit(&job).await {
            Ok(()) => {
                metrics::counter!("relay_jobs_enqueued_total").increment(1);
                RouteOutcome::Queued
            }
            Err(e) => {
                tracing::error!(
                    chat_id,
                    photo_path = %job.photo_path,
                    error = %e,
                    "Error sending job to queue"
                );
                metrics::counter!("relay_jobs_failed_total").increment(1);
                RouteOutcome::QueueFailed
            }
        };

        self.messenger
            .delete_message(chat_id, loading.message_id)
            .await?;

        metrics::histogram!("relay_photo_processing_seconds")
            .record(started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    /// Quoting needs the original message id; without one the reply is sent plain.
    async fn reply(&self, msg: &IncomingMessage, text: &str) -> Result<(), TelegramError> {
        match msg.message_id.filter(|_| self.quote_replies) {
            Some(quoted) => {
                self.messenger
                    .send_text_with_quote(msg.chat_id(), text, quoted)
                    .await?;
            }
            None => {
                self.messenger.send_text(msg.chat_id(), text).await?;
            }
        }
        Ok(())
    }
}
