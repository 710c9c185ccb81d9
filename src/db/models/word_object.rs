//! Detected word objects.
//!
//! One row per labeled box in a photo. Several rows may carry the same word
//! (the same thing photographed twice); the quiz treats those as a single
//! vocabulary entry keyed by [`vocabulary_key`], while each row keeps its own
//! photo link and `last_studied` stamp.

use serde::{Deserialize, Serialize};

/// Meaning placeholder written while the definition lookup is still running.
pub const PENDING_MEANING: &str = "Searching...";

/// Grouping key for a vocabulary entry.
pub fn vocabulary_key(word: &str) -> String {
    word.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordObject {
    pub id: i64,
    pub photo_id: i64,
    pub word: String,
    pub meaning: String,
    /// Serialized [`super::BoundingBox`], kept as text the way it is stored.
    pub bounding_box: Option<String>,
    /// Epoch milliseconds; `0` means never studied.
    pub last_studied: i64,
}

impl WordObject {
    pub fn key(&self) -> String {
        vocabulary_key(&self.word)
    }

    /// False while the meaning is empty or still being looked up.
    pub fn has_resolved_meaning(&self) -> bool {
        let meaning = self.meaning.trim();
        !meaning.is_empty() && meaning != PENDING_MEANING
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWordObject {
    pub photo_id: i64,
    pub word: String,
    pub meaning: String,
    pub bounding_box: Option<String>,
}

impl NewWordObject {
    /// A freshly detected object whose meaning has not been looked up yet.
    pub fn pending(photo_id: i64, word: impl Into<String>, bounding_box: Option<String>) -> Self {
        Self {
            photo_id,
            word: word.into(),
            meaning: PENDING_MEANING.to_string(),
            bounding_box,
        }
    }
}
