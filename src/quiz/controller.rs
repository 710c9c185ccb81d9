use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::{FileProbe, VocabularyStore};

use super::{
    config::QuizConfig,
    generator::{build_questions, load_snapshot},
    models::{AnswerOutcome, QuizProgress, QuizQuestion},
    persistence::MasteryWriter,
    session::SessionManager,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

struct QuizSession {
    manager: SessionManager,
    /// Question on screen, taken off the queue until it is answered.
    presented: Option<QuizQuestion>,
    session_id: Option<Uuid>,
}

impl QuizSession {
    fn progress(&self) -> QuizProgress {
        let total = self.manager.total_count();
        let remaining = self.manager.remaining_count() + usize::from(self.presented.is_some());

        QuizProgress {
            total,
            remaining,
            mastered: total.saturating_sub(remaining),
            is_complete: remaining == 0,
        }
    }

    fn clear(&mut self) {
        self.manager.initialize(Vec::new(), Default::default());
        self.presented = None;
        self.session_id = None;
    }
}

/// Runs one quiz at a time on top of a vocabulary store.
#[derive(Clone)]
pub struct QuizController {
    session: Arc<Mutex<QuizSession>>,
    store: Arc<dyn VocabularyStore>,
    files: Arc<dyn FileProbe>,
    mastery: MasteryWriter,
}

impl QuizController {
    pub fn new(
        store: Arc<dyn VocabularyStore>,
        files: Arc<dyn FileProbe>,
        mastery: MasteryWriter,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(QuizSession {
                manager: SessionManager::new(mastery.clone()),
                presented: None,
                session_id: None,
            })),
            store,
            files,
            mastery,
        }
    }

    /// Builds a fresh question set and replaces any session in progress.
    ///
    /// An empty vocabulary is not an error: the returned progress has a
    /// total of zero and is already complete.
    pub async fn start_session(&self, config: QuizConfig) -> Result<QuizProgress> {
        let snapshot = load_snapshot(self.store.as_ref()).await?;
        let files = Arc::clone(&self.files);

        // File existence checks hit the disk once per photo.
        let generated = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::from_entropy();
            build_questions(&snapshot, files.as_ref(), &config, &mut rng)
        })
        .await
        .context("question generation task failed")?;

        if generated.is_empty() {
            log_info!("Nothing to review yet; starting an empty session");
        }
        let total = generated.questions.len();
        let session_id = Uuid::new_v4();

        let mut session = self.session.lock().await;
        session.manager.initialize(generated.questions, generated.word_map);
        session.manager.set_total_count(total)?;
        session.presented = None;
        session.session_id = Some(session_id);

        log_info!("Started quiz session {session_id} with {total} questions");
        Ok(session.progress())
    }

    /// Question to show now, or `None` once everything has been answered
    /// correctly. Calling it again before answering returns the same question.
    pub async fn next_question(&self) -> Option<QuizQuestion> {
        let mut session = self.session.lock().await;
        if let Some(presented) = &session.presented {
            return Some(presented.clone());
        }

        let next = session.manager.get_next()?;
        session.presented = Some(next.clone());
        Some(next)
    }

    pub async fn submit_answer(&self, answer: &str) -> Result<AnswerOutcome> {
        let mut session = self.session.lock().await;
        let question = session
            .presented
            .take()
            .ok_or_else(|| anyhow!("no question is waiting for an answer"))?;

        let correct = answer.trim().to_lowercase() == question.correct_answer.trim().to_lowercase();
        let correct_answer = question.correct_answer.clone();

        if correct {
            session
                .manager
                .handle_correct(&question.correct_answer, question.photo_id);
        } else {
            log_debug!("Wrong answer '{answer}' for '{correct_answer}', requeueing");
            session.manager.handle_wrong(question);
        }

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            progress: session.progress(),
        })
    }

    pub async fn progress(&self) -> QuizProgress {
        self.session.lock().await.progress()
    }

    pub async fn session_id(&self) -> Option<Uuid> {
        self.session.lock().await.session_id
    }

    /// Abandons the current session and waits for pending mastery writes.
    pub async fn end_session(&self) -> Result<QuizProgress> {
        let progress = {
            let mut session = self.session.lock().await;
            let progress = session.progress();
            if let Some(id) = session.session_id {
                log_info!(
                    "Ending quiz session {id}: {}/{} mastered",
                    progress.mastered,
                    progress.total
                );
            }
            session.clear();
            progress
        };

        self.mastery.flush().await?;
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::quiz::persistence::RetryPolicy;
    use crate::store::MemoryStore;

    struct AllFiles;

    impl FileProbe for AllFiles {
        fn file_exists(&self, _path: &str) -> bool {
            true
        }
    }

    fn controller(store: Arc<MemoryStore>) -> (QuizController, MasteryWriter) {
        let writer = MasteryWriter::spawn(store.clone(), RetryPolicy::default());
        (
            QuizController::new(store, Arc::new(AllFiles), writer.clone()),
            writer,
        )
    }

    fn seeded_store(words: &[&str]) -> (Arc<MemoryStore>, Vec<i64>) {
        let store = Arc::new(MemoryStore::new());
        let ids = words
            .iter()
            .map(|word| {
                let photo = store.add_photo(Some(format!("/{word}.jpg").as_str()));
                store.add_word_object(photo, word, "뜻", 0)
            })
            .collect();
        (store, ids)
    }

    #[tokio::test]
    async fn empty_vocabulary_is_complete_immediately() {
        let (controller, _) = controller(Arc::new(MemoryStore::new()));

        let progress = controller.start_session(QuizConfig::default()).await.unwrap();
        assert_eq!(progress.total, 0);
        assert!(progress.is_complete);
        assert!(controller.next_question().await.is_none());
    }

    #[tokio::test]
    async fn answering_everything_correctly_finishes_the_quiz() {
        let (store, ids) = seeded_store(&["apple", "banana", "cherry"]);
        let (controller, writer) = controller(store.clone());

        let progress = controller.start_session(QuizConfig::default()).await.unwrap();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.remaining, 3);

        let mut seen = HashSet::new();
        while let Some(question) = controller.next_question().await {
            assert!(question.options.contains(&question.correct_answer));
            seen.insert(question.word.clone());
            let outcome = controller
                .submit_answer(&format!("  {} ", question.correct_answer.to_uppercase()))
                .await
                .unwrap();
            assert!(outcome.correct);
        }

        let progress = controller.progress().await;
        assert_eq!(progress.mastered, 3);
        assert!(progress.is_complete);
        assert_eq!(seen.len(), 3);

        writer.flush().await.unwrap();
        for id in ids {
            assert!(store.word_object(id).unwrap().last_studied > 0);
        }
    }

    #[tokio::test]
    async fn wrong_answer_comes_back_later() {
        let (store, ids) = seeded_store(&["apple", "banana"]);
        let (controller, writer) = controller(store.clone());
        controller.start_session(QuizConfig::default()).await.unwrap();

        let first = controller.next_question().await.unwrap();
        let outcome = controller.submit_answer("definitely wrong").await.unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, first.correct_answer);
        assert_eq!(outcome.progress.remaining, 2);
        assert_eq!(outcome.progress.mastered, 0);

        let second = controller.next_question().await.unwrap();
        assert_ne!(second.word, first.word);
        controller.submit_answer(&second.correct_answer).await.unwrap();

        let again = controller.next_question().await.unwrap();
        assert_eq!(again, first);

        writer.flush().await.unwrap();
        let stamped: Vec<i64> = ids
            .iter()
            .map(|id| store.word_object(*id).unwrap().last_studied)
            .collect();
        assert_eq!(stamped.iter().filter(|at| **at == 0).count(), 1);
    }

    #[tokio::test]
    async fn presented_question_is_stable_until_answered() {
        let (store, _) = seeded_store(&["apple", "banana"]);
        let (controller, _) = controller(store);
        controller.start_session(QuizConfig::default()).await.unwrap();

        let first = controller.next_question().await.unwrap();
        assert_eq!(controller.next_question().await.unwrap(), first);
        assert_eq!(controller.progress().await.remaining, 2);
    }

    #[tokio::test]
    async fn answer_without_question_is_rejected() {
        let (store, _) = seeded_store(&["apple", "banana"]);
        let (controller, _) = controller(store);
        controller.start_session(QuizConfig::default()).await.unwrap();

        assert!(controller.submit_answer("apple").await.is_err());
    }

    #[tokio::test]
    async fn restarting_replaces_the_session() {
        let (store, _) = seeded_store(&["apple", "banana", "cherry"]);
        let (controller, _) = controller(store);

        controller.start_session(QuizConfig::default()).await.unwrap();
        let first_id = controller.session_id().await;
        controller.next_question().await.unwrap();

        let progress = controller
            .start_session(QuizConfig {
                cohort_size: 2,
                ..QuizConfig::default()
            })
            .await
            .unwrap();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.remaining, 2);
        assert_ne!(controller.session_id().await, first_id);
    }

    #[tokio::test]
    async fn ending_clears_the_session() {
        let (store, _) = seeded_store(&["apple", "banana"]);
        let (controller, _) = controller(store);
        controller.start_session(QuizConfig::default()).await.unwrap();
        let question = controller.next_question().await.unwrap();
        controller.submit_answer(&question.correct_answer).await.unwrap();

        let summary = controller.end_session().await.unwrap();
        assert_eq!(summary.mastered, 1);
        assert_eq!(summary.total, 2);

        assert!(controller.next_question().await.is_none());
        assert!(controller.session_id().await.is_none());
        assert_eq!(controller.progress().await.total, 0);
    }
}
