use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::message::ChatId;

/// Object-storage prefix photos are uploaded under.
pub const PHOTO_KEY_PREFIX: &str = "photos/";

/// An object-detection job handed to the queue consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Object-storage key of the uploaded photo.
    pub photo_path: String,
    pub chat_id: ChatId,
}

impl JobDescriptor {
    pub fn new(photo_path: impl Into<String>, chat_id: ChatId) -> Self {
        Self {
            photo_path: photo_path.into(),
            chat_id,
        }
    }
}

/// Storage key for a downloaded photo: `photos/<basename>`.
///
/// Returns `None` when the path has no file name component.
pub fn photo_storage_key(local_path: &Path) -> Option<String> {
    let name = local_path.file_name()?.to_str()?;
    Some(format!("{PHOTO_KEY_PREFIX}{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_uses_basename() {
        let key = photo_storage_key(Path::new("downloads/photos/file_12.jpg"));
        assert_eq!(key.as_deref(), Some("photos/file_12.jpg"));
    }

    #[test]
    fn test_storage_key_without_file_name() {
        assert_eq!(photo_storage_key(Path::new("/")), None);
        assert_eq!(photo_storage_key(Path::new("photos/..")), None);
    }

    #[test]
    fn test_job_wire_format() {
        let job = JobDescriptor::new("photos/file_12.jpg", -100123);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"photo_path": "photos/file_12.jpg", "chat_id": -100123})
        );
    }
}
