pub mod db;
pub mod quiz;
pub mod settings;
pub mod store;
mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};

use db::Database;
use quiz::{MasteryWriter, QuizController};
use settings::SettingsStore;
use store::LocalFiles;

/// Everything a UI bridge needs to drive the quiz.
pub struct AppState {
    pub db: Database,
    pub quiz: QuizController,
    pub settings: SettingsStore,
    mastery: MasteryWriter,
}

impl AppState {
    /// Opens (or creates) the app data in `data_dir`.
    ///
    /// Must be called from inside a tokio runtime: the mastery writer is
    /// spawned onto it.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::new(data_dir.join("vocasnap.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        let mastery = MasteryWriter::spawn(Arc::new(database.clone()), settings.retry_policy());
        let quiz = QuizController::new(
            Arc::new(database.clone()),
            Arc::new(LocalFiles),
            mastery.clone(),
        );

        log::info!("Opened vocabulary at {}", database.path().display());

        Ok(Self {
            db: database,
            quiz,
            settings,
            mastery,
        })
    }

    /// Writes out pending mastery updates and stops the background writer.
    pub async fn shutdown(&self) -> Result<()> {
        self.mastery.shutdown().await
    }
}

/// Installs `env_logger` at `Info`, overridable through `RUST_LOG`.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
