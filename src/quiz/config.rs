use serde::{Deserialize, Serialize};

/// Tunables for question generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizConfig {
    /// Most vocabulary entries reviewed in one session.
    pub cohort_size: usize,

    /// Wrong options shown next to the correct answer. A question is built
    /// with fewer when the vocabulary is small, but never with none.
    pub distractor_count: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            cohort_size: 20,
            distractor_count: 3,
        }
    }
}
