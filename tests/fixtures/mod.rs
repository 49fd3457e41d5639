//! Sample Telegram updates and stored detection results

#![allow(dead_code)]

use detection_relay::models::message::{IncomingMessage, Update};
use detection_relay::models::result::{DetectedLabel, ResultRecord};

pub const CHAT_ID: i64 = -100_200_300;

pub fn text_update(text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": 10001,
        "message": {
            "message_id": 77,
            "date": 1_700_000_000,
            "chat": {"id": CHAT_ID, "type": "private"},
            "from": {"id": 888, "is_bot": false, "first_name": "Alice"},
            "text": text
        }
    })
}

/// A photo in three resolutions, as Telegram sends it (smallest first).
pub fn photo_update() -> serde_json::Value {
    serde_json::json!({
        "update_id": 10002,
        "message": {
            "message_id": 78,
            "date": 1_700_000_010,
            "chat": {"id": CHAT_ID, "type": "private"},
            "photo": [
                {"file_id": "AgAD-small", "file_unique_id": "s", "width": 90, "height": 67, "file_size": 1450},
                {"file_id": "AgAD-medium", "file_unique_id": "m", "width": 320, "height": 240, "file_size": 21870},
                {"file_id": "AgAD-large", "file_unique_id": "l", "width": 1280, "height": 960, "file_size": 180345}
            ]
        }
    })
}

pub fn sticker_update() -> serde_json::Value {
    serde_json::json!({
        "update_id": 10003,
        "message": {
            "message_id": 79,
            "chat": {"id": CHAT_ID, "type": "private"},
            "sticker": {"file_id": "CAACAgIAAxk", "width": 512, "height": 512}
        }
    })
}

pub fn edited_message_update() -> serde_json::Value {
    serde_json::json!({
        "update_id": 10004,
        "edited_message": {
            "message_id": 77,
            "chat": {"id": CHAT_ID, "type": "private"},
            "text": "edited"
        }
    })
}

/// Hand-written load-test body: no update or message ids, only the chat and content.
pub fn minimal_text_update(text: &str) -> serde_json::Value {
    serde_json::json!({"message": {"chat": {"id": CHAT_ID}, "text": text}})
}

pub fn minimal_photo_update() -> serde_json::Value {
    serde_json::json!({
        "message": {
            "chat": {"id": CHAT_ID},
            "photo": [{"file_id": "AgAD-load", "width": 640, "height": 480}]
        }
    })
}

pub fn message(update: serde_json::Value) -> IncomingMessage {
    let update: Update = serde_json::from_value(update).expect("valid update fixture");
    update.message.expect("fixture carries a message")
}

pub fn detection_record(prediction_id: &str, classes: &[&str]) -> ResultRecord {
    ResultRecord {
        prediction_id: prediction_id.to_string(),
        chat_id: CHAT_ID,
        labels: classes
            .iter()
            .map(|class| DetectedLabel {
                class: class.to_string(),
                cx: Some(0.5),
                cy: Some(0.5),
                width: Some(0.25),
                height: Some(0.25),
            })
            .collect(),
        original_img_path: Some("photos/file_12.jpg".to_string()),
        predicted_img_path: Some("predictions/file_12.jpg".to_string()),
        time: Some("2024-05-01 12:30:00".to_string()),
    }
}
