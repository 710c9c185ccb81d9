use std::collections::{HashMap, VecDeque};

use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::vocabulary_key;

use super::{
    models::QuizQuestion,
    persistence::{MasteryUpdate, MasteryWriter},
};

/// Question queue for one quiz session.
///
/// Questions are served front to back. A wrong answer sends the question to
/// the back of the queue untouched; a correct one drops it for good and
/// queues a "studied now" stamp for every sighting of the word. The session
/// is over when [`SessionManager::get_next`] returns `None`.
pub struct SessionManager {
    queue: VecDeque<QuizQuestion>,
    word_map: HashMap<String, i64>,
    total_count: Option<usize>,
    mastery: MasteryWriter,
}

impl SessionManager {
    pub fn new(mastery: MasteryWriter) -> Self {
        Self {
            queue: VecDeque::new(),
            word_map: HashMap::new(),
            total_count: None,
            mastery,
        }
    }

    /// Starts a session, discarding whatever was left of the previous one.
    pub fn initialize(&mut self, questions: Vec<QuizQuestion>, word_map: HashMap<String, i64>) {
        self.queue = questions.into();
        self.word_map = word_map;
        self.total_count = None;
    }

    pub fn get_next(&mut self) -> Option<QuizQuestion> {
        self.queue.pop_front()
    }

    /// Queues the mastery write for `word`; returns without waiting for it.
    pub fn handle_correct(&self, word: &str, photo_id: i64) {
        let key = vocabulary_key(word);
        let word_object_id = self.word_map.get(&key).copied();

        self.mastery.submit(MasteryUpdate {
            word: key,
            studied_at_ms: Utc::now().timestamp_millis(),
            photo_id,
            word_object_id,
        });
    }

    pub fn handle_wrong(&mut self, question: QuizQuestion) {
        self.queue.push_back(question);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining_count(&self) -> usize {
        self.queue.len()
    }

    /// Records the session size for progress display; allowed once per session.
    pub fn set_total_count(&mut self, count: usize) -> Result<()> {
        if let Some(existing) = self.total_count {
            bail!("total count already set to {existing} for this session");
        }
        self.total_count = Some(count);
        Ok(())
    }

    pub fn total_count(&self) -> usize {
        self.total_count.unwrap_or(0)
    }

    /// Word object the session's question for `word` was built from.
    pub fn word_object_id(&self, word: &str) -> Option<i64> {
        self.word_map.get(&vocabulary_key(word)).copied()
    }
}
