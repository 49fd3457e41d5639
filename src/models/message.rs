use serde::Deserialize;
use strum::{Display, IntoStaticStr};

/// Telegram chat identifier.
pub type ChatId = i64;

/// Telegram message identifier, unique within a chat.
pub type MessageId = i64;

/// Webhook envelope posted by Telegram for every update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

/// A chat message delivered through the webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Absent in hand-written load-test payloads.
    #[serde(default)]
    pub message_id: Option<MessageId>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    /// Resolution variants of an attached photo, smallest first.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

/// One resolution variant of a photo attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Message returned by Telegram after a successful send.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: MessageId,
    pub chat: Chat,
}

/// What an incoming message carries, in routing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    Photo,
    Text,
    Unsupported,
}

impl IncomingMessage {
    pub fn chat_id(&self) -> ChatId {
        self.chat.id
    }

    /// Highest-resolution photo variant, if the message carries a photo.
    ///
    /// Equal areas resolve to the later entry, matching Telegram's ordering.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_deref()?
            .iter()
            .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
    }

    pub fn kind(&self) -> MessageKind {
        if self.largest_photo().is_some() {
            MessageKind::Photo
        } else if self.text.is_some() {
            MessageKind::Text
        } else {
            MessageKind::Unsupported
        }
    }
}
