use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::models::message::{ChatId, MessageId, PhotoSize, SentMessage};

/// Pause between dropping the old webhook and installing the new one.
const WEBHOOK_RESET_DELAY: Duration = Duration::from_millis(500);

/// Outbound side of the messaging platform, as seen by the message router.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, TelegramError>;

    /// Send `text` as a reply quoting `quoted` in the same chat.
    async fn send_text_with_quote(
        &self,
        chat_id: ChatId,
        text: &str,
        quoted: MessageId,
    ) -> Result<SentMessage, TelegramError>;

    async fn send_animation(
        &self,
        chat_id: ChatId,
        animation: &AnimationSource,
    ) -> Result<SentMessage, TelegramError>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
        -> Result<(), TelegramError>;

    /// Download a photo variant to local storage, returning where it was written.
    async fn download_photo(&self, photo: &PhotoSize) -> Result<PathBuf, TelegramError>;
}

/// Where an animation comes from: a local file to upload, or something Telegram already knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationSource {
    File(PathBuf),
    /// A Telegram `file_id` or an HTTP URL.
    Remote(String),
}

impl AnimationSource {
    /// Interpret a configured value: an existing local path is uploaded, anything else is
    /// passed to Telegram verbatim.
    pub fn from_config(value: &str) -> Self {
        let path = Path::new(value);
        if path.is_file() {
            return AnimationSource::File(path.to_path_buf());
        }
        if looks_like_path(value) {
            tracing::warn!(
                loading_animation = value,
                "Loading animation is not a local file; Telegram will be asked for it as a file id or URL"
            );
        }
        AnimationSource::Remote(value.to_string())
    }
}

/// File ids never contain a `/` or an extension; URLs are expected to be remote.
fn looks_like_path(value: &str) -> bool {
    if value.starts_with("http://") || value.starts_with("https://") {
        return false;
    }
    value.contains('/') || Path::new(value).extension().is_some()
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// File metadata returned by `getFile`.
#[derive(Debug, Deserialize)]
pub struct TelegramFile {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Bot identity returned by `getMe`.
#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<MessageId>,
}

/// Client for the Telegram Bot API.
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
    download_dir: PathBuf,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            download_dir: download_dir.into(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(TelegramError::Http)?;
        Self::unwrap_response(method, response).await
    }

    async fn call_multipart<T>(&self, method: &'static str, form: Form) -> Result<T, TelegramError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.api_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(TelegramError::Http)?;
        Self::unwrap_response(method, response).await
    }

    /// Telegram answers errors with a JSON body and a non-2xx status, so the body is
    /// decoded before looking at the status.
    async fn unwrap_response<T: DeserializeOwned>(
        method: &'static str,
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let api: ApiResponse<T> = response.json().await.map_err(TelegramError::Http)?;
        if !api.ok {
            return Err(TelegramError::Api {
                method,
                code: api.error_code,
                description: api.description.unwrap_or_default(),
            });
        }
        api.result.ok_or(TelegramError::MissingResult(method))
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to_message_id: Option<MessageId>,
    ) -> Result<SentMessage, TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_to_message_id,
        };
        self.call("sendMessage", &request).await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile, TelegramError> {
        self.call("getFile", &serde_json::json!({ "file_id": file_id }))
            .await
    }

    /// Download raw file bytes from the Telegram file endpoint.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>, TelegramError> {
        let response = self
            .http
            .get(self.file_url(file_path))
            .send()
            .await
            .map_err(TelegramError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Download {
                file_path: file_path.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(TelegramError::Http)?;
        Ok(bytes.to_vec())
    }

    pub async fn get_me(&self) -> Result<BotUser, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn delete_webhook(&self) -> Result<bool, TelegramError> {
        self.call("deleteWebhook", &serde_json::json!({})).await
    }

    /// Point Telegram at `url`, uploading `certificate` when the endpoint uses a
    /// self-signed one.
    pub async fn set_webhook(
        &self,
        url: &str,
        certificate: Option<&Path>,
    ) -> Result<bool, TelegramError> {
        match certificate {
            Some(path) => {
                let pem = tokio::fs::read(path).await.map_err(TelegramError::Io)?;
                let form = Form::new()
                    .text("url", url.to_string())
                    .part("certificate", Part::bytes(pem).file_name(file_name(path)));
                self.call_multipart("setWebhook", form).await
            }
            None => {
                self.call("setWebhook", &serde_json::json!({ "url": url }))
                    .await
            }
        }
    }

    /// Replace any existing webhook with `<public_url>/<token>/` and log the bot identity.
    pub async fn register_webhook(
        &self,
        public_url: &str,
        certificate: Option<&Path>,
    ) -> Result<(), TelegramError> {
        self.delete_webhook().await?;
        tokio::time::sleep(WEBHOOK_RESET_DELAY).await;

        let url = webhook_url(public_url, &self.token);
        self.set_webhook(&url, certificate).await?;

        let me = self.get_me().await?;
        tracing::info!(
            bot_id = me.id,
            bot_name = %me.first_name,
            bot_username = me.username.as_deref().unwrap_or(""),
            "Telegram webhook registered"
        );
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, TelegramError> {
        self.send_message(chat_id, text, None).await
    }

    async fn send_text_with_quote(
        &self,
        chat_id: ChatId,
        text: &str,
        quoted: MessageId,
    ) -> Result<SentMessage, TelegramError> {
        self.send_message(chat_id, text, Some(quoted)).await
    }

    async fn send_animation(
        &self,
        chat_id: ChatId,
        animation: &AnimationSource,
    ) -> Result<SentMessage, TelegramError> {
        match animation {
            AnimationSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(TelegramError::Io)?;
                let form = Form::new()
                    .text("chat_id", chat_id.to_string())
                    .part("animation", Part::bytes(bytes).file_name(file_name(path)));
                self.call_multipart("sendAnimation", form).await
            }
            AnimationSource::Remote(id_or_url) => {
                self.call(
                    "sendAnimation",
                    &serde_json::json!({ "chat_id": chat_id, "animation": id_or_url }),
                )
                .await
            }
        }
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &serde_json::json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn download_photo(&self, photo: &PhotoSize) -> Result<PathBuf, TelegramError> {
        let file = self.get_file(&photo.file_id).await?;
        let remote_path = file
            .file_path
            .ok_or_else(|| TelegramError::MissingFilePath(photo.file_id.clone()))?;

        let data = self.download_file(&remote_path).await?;

        let local_path = local_download_path(&self.download_dir, &remote_path)
            .ok_or_else(|| TelegramError::MissingFilePath(photo.file_id.clone()))?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(TelegramError::Io)?;
        }
        tokio::fs::write(&local_path, &data)
            .await
            .map_err(TelegramError::Io)?;

        tracing::debug!(
            file_id = %photo.file_id,
            bytes = data.len(),
            path = %local_path.display(),
            "Photo downloaded"
        );
        Ok(local_path)
    }
}

/// Webhook URL Telegram posts updates to: the token doubles as the path secret.
pub fn webhook_url(public_url: &str, token: &str) -> String {
    format!("{}/{}/", public_url.trim_end_matches('/'), token)
}

/// Map a Telegram `file_path` (e.g. `photos/file_12.jpg`) under `download_dir`, keeping
/// only plain path components.
fn local_download_path(download_dir: &Path, remote_path: &str) -> Option<PathBuf> {
    let relative: PathBuf = Path::new(remote_path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    relative.file_name()?;
    Some(download_dir.join(relative))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram {method} failed ({code:?}): {description}")]
    Api {
        method: &'static str,
        code: Option<i64>,
        description: String,
    },

    #[error("Telegram {0} returned no result")]
    MissingResult(&'static str),

    #[error("Telegram returned no usable file path for {0}")]
    MissingFilePath(String),

    #[error("Downloading {file_path} failed with HTTP {status}")]
    Download { file_path: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
