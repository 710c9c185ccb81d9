//! Seams between the quiz engine and the outside world.
//!
//! The engine only ever talks to a [`VocabularyStore`] and a [`FileProbe`];
//! the SQLite [`Database`](crate::db::Database) and the local filesystem are
//! the production implementations, [`MemoryStore`] stands in for tests and
//! hosts that keep vocabulary elsewhere.

mod files;
mod memory;
mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::{ExampleSentence, Photo, WordObject};

pub use files::{FileProbe, LocalFiles};
pub use memory::MemoryStore;

/// Query contract the quiz engine needs from vocabulary storage.
///
/// Word matching is case-insensitive everywhere.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    async fn get_all_photos(&self) -> Result<Vec<Photo>>;

    /// Word objects in store order; ties in the cohort keep this order.
    async fn get_all_word_objects(&self) -> Result<Vec<WordObject>>;

    async fn get_all_example_sentences(&self) -> Result<Vec<ExampleSentence>>;

    async fn get_word_objects_by_word(&self, word: &str) -> Result<Vec<WordObject>>;

    /// Stamps every word object sharing `word`; returns the number of rows touched.
    async fn update_last_studied(&self, word: &str, studied_at_ms: i64) -> Result<usize>;
}
