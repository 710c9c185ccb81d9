use serde::{Deserialize, Serialize};

/// A usage example attached to one word object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExampleSentence {
    pub id: i64,
    pub word_object_id: i64,
    pub sentence: String,
    pub translation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExampleSentence {
    pub word_object_id: i64,
    pub sentence: String,
    pub translation: String,
}
