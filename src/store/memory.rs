use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use super::VocabularyStore;
use crate::db::{vocabulary_key, ExampleSentence, Photo, WordObject};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    photos: Vec<Photo>,
    word_objects: Vec<WordObject>,
    sentences: Vec<ExampleSentence>,
    failing_updates: u32,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Vocabulary kept in process memory, with the same semantics as the SQLite
/// store (case-insensitive word matching, cascading photo deletes).
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_photo(&self, file_path: Option<&str>) -> i64 {
        let mut state = self.lock();
        let id = state.allocate_id();
        state.photos.push(Photo {
            id,
            file_path: file_path.map(str::to_string),
            created_at: Utc::now(),
        });
        id
    }

    /// Inserts a word object with an explicit id, for fixtures that refer to
    /// rows by number. Ids handed out later never collide with it.
    pub fn insert_word_object(&self, object: WordObject) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(object.id);
        state.word_objects.push(object);
    }

    pub fn add_word_object(
        &self,
        photo_id: i64,
        word: &str,
        meaning: &str,
        last_studied: i64,
    ) -> i64 {
        let mut state = self.lock();
        let id = state.allocate_id();
        state.word_objects.push(WordObject {
            id,
            photo_id,
            word: word.to_string(),
            meaning: meaning.to_string(),
            bounding_box: None,
            last_studied,
        });
        id
    }

    pub fn add_example_sentence(&self, word_object_id: i64, sentence: &str, translation: &str) -> i64 {
        let mut state = self.lock();
        let id = state.allocate_id();
        state.sentences.push(ExampleSentence {
            id,
            word_object_id,
            sentence: sentence.to_string(),
            translation: translation.to_string(),
        });
        id
    }

    pub fn delete_photo(&self, photo_id: i64) {
        let mut state = self.lock();
        state.photos.retain(|p| p.id != photo_id);

        let removed: Vec<i64> = state
            .word_objects
            .iter()
            .filter(|o| o.photo_id == photo_id)
            .map(|o| o.id)
            .collect();
        state.word_objects.retain(|o| o.photo_id != photo_id);
        state
            .sentences
            .retain(|s| !removed.contains(&s.word_object_id));
    }

    pub fn word_object(&self, id: i64) -> Option<WordObject> {
        self.lock().word_objects.iter().find(|o| o.id == id).cloned()
    }

    /// Makes the next `count` calls to `update_last_studied` fail, the way a
    /// locked or full database would.
    pub fn fail_next_updates(&self, count: u32) {
        self.lock().failing_updates = count;
    }
}

#[async_trait]
impl VocabularyStore for MemoryStore {
    async fn get_all_photos(&self) -> Result<Vec<Photo>> {
        Ok(self.lock().photos.clone())
    }

    async fn get_all_word_objects(&self) -> Result<Vec<WordObject>> {
        Ok(self.lock().word_objects.clone())
    }

    async fn get_all_example_sentences(&self) -> Result<Vec<ExampleSentence>> {
        Ok(self.lock().sentences.clone())
    }

    async fn get_word_objects_by_word(&self, word: &str) -> Result<Vec<WordObject>> {
        let key = vocabulary_key(word);
        Ok(self
            .lock()
            .word_objects
            .iter()
            .filter(|o| o.key() == key)
            .cloned()
            .collect())
    }

    async fn update_last_studied(&self, word: &str, studied_at_ms: i64) -> Result<usize> {
        let key = vocabulary_key(word);
        let mut state = self.lock();

        if state.failing_updates > 0 {
            state.failing_updates -= 1;
            bail!("simulated write failure for '{word}'");
        }

        let mut touched = 0;
        for object in state.word_objects.iter_mut().filter(|o| o.key() == key) {
            object.last_studied = studied_at_ms;
            touched += 1;
        }
        Ok(touched)
    }
}
