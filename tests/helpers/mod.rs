//! Recording fakes for the external services the relay talks to

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use detection_relay::app_state::AppState;
use detection_relay::models::job::JobDescriptor;
use detection_relay::models::message::{Chat, ChatId, MessageId, PhotoSize, SentMessage};
use detection_relay::models::result::ResultRecord;
use detection_relay::services::queue::{JobSink, QueueError};
use detection_relay::services::results::{ResultStore, ResultStoreError};
use detection_relay::services::router::MessageRouter;
use detection_relay::services::storage::{BlobStore, StorageError};
use detection_relay::services::telegram::{AnimationSource, Messenger, TelegramError};

pub const TEST_TOKEN: &str = "123456:TEST-token";
pub const LOADING_GIF: &str = "CgACAgQAAxkBAAIBloading";

/// One outbound call made to the messaging platform.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Text { chat_id: ChatId, text: String },
    QuotedText { chat_id: ChatId, text: String, quoted: MessageId },
    Animation { chat_id: ChatId, message_id: MessageId },
    Delete { chat_id: ChatId, message_id: MessageId },
    Download { file_id: String },
}

#[derive(Default)]
pub struct FakeMessenger {
    calls: Mutex<Vec<Call>>,
    next_message_id: AtomicI64,
    fail: bool,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1000),
            ..Self::default()
        }
    }

    /// A messenger whose every call fails, as if the bot were blocked.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Text { text, .. } | Call::QuotedText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn check(&self, method: &'static str) -> Result<(), TelegramError> {
        if self.fail {
            return Err(TelegramError::Api {
                method,
                code: Some(403),
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        Ok(())
    }

    fn sent(&self, chat_id: ChatId) -> SentMessage {
        SentMessage {
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            chat: Chat { id: chat_id },
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, TelegramError> {
        self.check("sendMessage")?;
        self.record(Call::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(self.sent(chat_id))
    }

    async fn send_text_with_quote(
        &self,
        chat_id: ChatId,
        text: &str,
        quoted: MessageId,
    ) -> Result<SentMessage, TelegramError> {
        self.check("sendMessage")?;
        self.record(Call::QuotedText {
            chat_id,
            text: text.to_string(),
            quoted,
        });
        Ok(self.sent(chat_id))
    }

    async fn send_animation(
        &self,
        chat_id: ChatId,
        _animation: &AnimationSource,
    ) -> Result<SentMessage, TelegramError> {
        self.check("sendAnimation")?;
        let sent = self.sent(chat_id);
        self.record(Call::Animation {
            chat_id,
            message_id: sent.message_id,
        });
        Ok(sent)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TelegramError> {
        self.check("deleteMessage")?;
        self.record(Call::Delete {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn download_photo(&self, photo: &PhotoSize) -> Result<PathBuf, TelegramError> {
        self.check("getFile")?;
        self.record(Call::Download {
            file_id: photo.file_id.clone(),
        });
        Ok(PathBuf::from(format!("downloads/photos/{}.jpg", photo.file_id)))
    }
}

#[derive(Default)]
pub struct FakeStorage {
    uploads: Mutex<Vec<(PathBuf, String)>>,
    fail: bool,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeStorage {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Status {
                key: key.to_string(),
                status: 403,
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((local_path.to_path_buf(), key.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeQueue {
    jobs: Mutex<Vec<JobDescriptor>>,
    fail: bool,
}

impl FakeQueue {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<JobDescriptor> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSink for FakeQueue {
    async fn submit(&self, job: &JobDescriptor) -> Result<(), QueueError> {
        if self.fail {
            return Err(QueueError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))));
        }
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeResults {
    records: HashMap<String, ResultRecord>,
    fail: bool,
}

impl FakeResults {
    pub fn with_record(mut self, record: ResultRecord) -> Self {
        self.records.insert(record.prediction_id.clone(), record);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResultStore for FakeResults {
    async fn get(&self, prediction_id: &str) -> Result<Option<ResultRecord>, ResultStoreError> {
        if self.fail {
            return Err(ResultStoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection reset",
            ))));
        }
        Ok(self.records.get(prediction_id).cloned())
    }
}

/// The fakes behind one router, kept so tests can inspect them afterwards.
pub struct Harness {
    pub messenger: Arc<FakeMessenger>,
    pub storage: Arc<FakeStorage>,
    pub queue: Arc<FakeQueue>,
    pub results: Arc<FakeResults>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            FakeMessenger::new(),
            FakeStorage::default(),
            FakeQueue::default(),
            FakeResults::default(),
        )
    }

    pub fn with(
        messenger: FakeMessenger,
        storage: FakeStorage,
        queue: FakeQueue,
        results: FakeResults,
    ) -> Self {
        Self {
            messenger: Arc::new(messenger),
            storage: Arc::new(storage),
            queue: Arc::new(queue),
            results: Arc::new(results),
        }
    }

    pub fn router(&self) -> MessageRouter {
        MessageRouter::new(
            self.messenger.clone(),
            self.storage.clone(),
            self.queue.clone(),
            AnimationSource::Remote(LOADING_GIF.to_string()),
        )
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.router(),
            self.messenger.clone(),
            self.results.clone(),
            TEST_TOKEN,
        )
    }
}
