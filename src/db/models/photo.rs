//! Captured photo records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `file_path` value of a photo that only exists on the sync server.
pub const REMOTE_PLACEHOLDER_PATH: &str = "remote://placeholder";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// Path of the image on this device, if there is one.
    pub fn local_path(&self) -> Option<&str> {
        match self.file_path.as_deref() {
            Some(REMOTE_PLACEHOLDER_PATH) | Some("") | None => None,
            Some(path) => Some(path),
        }
    }

    pub fn is_remote_placeholder(&self) -> bool {
        self.file_path.as_deref() == Some(REMOTE_PLACEHOLDER_PATH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPhoto {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            file_path: Some(path.into()),
            created_at: Utc::now(),
        }
    }

    pub fn remote_placeholder() -> Self {
        Self {
            file_path: Some(REMOTE_PLACEHOLDER_PATH.to_string()),
            created_at: Utc::now(),
        }
    }
}
