//! Types handed to the UI while a quiz is running. Nothing here is persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::BoundingBox;

/// One multiple-choice question about a photographed word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub image_path: Option<String>,
    pub bounding_box: Option<String>,
    pub word: String,
    pub meaning: String,
    /// Empty when no sighting of the word has an example.
    pub example_sentence: String,
    pub example_translation: String,
    pub correct_answer: String,
    /// Correct answer plus distractors, already shuffled.
    pub options: Vec<String>,
    pub photo_id: i64,
}

impl QuizQuestion {
    /// Parsed crop box; `None` means show the whole image. Boxes with no
    /// area cannot be cropped to and count as missing.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let parsed: BoundingBox = self.bounding_box.as_deref()?.parse().ok()?;
        (parsed.width() > 0.0 && parsed.height() > 0.0).then_some(parsed)
    }

    pub fn has_example(&self) -> bool {
        !self.example_sentence.is_empty()
    }
}

/// Result of one generation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuiz {
    pub questions: Vec<QuizQuestion>,
    /// Lower-cased word -> id of the word object the question was built from.
    pub word_map: HashMap<String, i64>,
}

impl GeneratedQuiz {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub total: usize,
    pub remaining: usize,
    pub mastered: usize,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub progress: QuizProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(bounding_box: Option<&str>) -> QuizQuestion {
        QuizQuestion {
            image_path: Some("/a.jpg".into()),
            bounding_box: bounding_box.map(str::to_string),
            word: "cat".into(),
            meaning: "고양이".into(),
            example_sentence: String::new(),
            example_translation: String::new(),
            correct_answer: "cat".into(),
            options: vec!["cat".into(), "dog".into()],
            photo_id: 1,
        }
    }

    #[test]
    fn unparsable_box_falls_back_to_whole_image() {
        assert!(question(Some("0.1,0.1,0.4,0.4")).bounding_box().is_some());
        assert!(question(Some("garbage")).bounding_box().is_none());
        assert!(question(None).bounding_box().is_none());
        assert!(!question(None).has_example());
    }

    #[test]
    fn zero_area_box_falls_back_to_whole_image() {
        assert!(question(Some("0.2,0.3,0.2,0.8")).bounding_box().is_none());
        assert!(question(Some("0.2,0.5,0.7,0.5")).bounding_box().is_none());

        let crop = question(Some("0.2,0.25,0.7,0.75")).bounding_box().unwrap();
        assert!((crop.height() - 0.5).abs() < 1e-6);
    }
}
