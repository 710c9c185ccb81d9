use anyhow::Result;
use async_trait::async_trait;

use super::VocabularyStore;
use crate::db::{Database, ExampleSentence, Photo, WordObject};

#[async_trait]
impl VocabularyStore for Database {
    async fn get_all_photos(&self) -> Result<Vec<Photo>> {
        Database::get_all_photos(self).await
    }

    async fn get_all_word_objects(&self) -> Result<Vec<WordObject>> {
        Database::get_all_word_objects(self).await
    }

    async fn get_all_example_sentences(&self) -> Result<Vec<ExampleSentence>> {
        Database::get_all_example_sentences(self).await
    }

    async fn get_word_objects_by_word(&self, word: &str) -> Result<Vec<WordObject>> {
        Database::get_word_objects_by_word(self, word).await
    }

    async fn update_last_studied(&self, word: &str, studied_at_ms: i64) -> Result<usize> {
        Database::update_last_studied(self, word, studied_at_ms).await
    }
}
