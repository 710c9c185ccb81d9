pub mod commands;
pub mod config;
pub mod controller;
pub mod generator;
pub mod models;
pub mod persistence;
pub mod session;

pub use config::QuizConfig;
pub use controller::QuizController;
pub use generator::{build_questions, generate_questions, load_snapshot, VocabularySnapshot};
pub use models::{AnswerOutcome, GeneratedQuiz, QuizProgress, QuizQuestion};
pub use persistence::{MasteryUpdate, MasteryWriter, RetryPolicy};
pub use session::SessionManager;
