use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct WorkerHandle {
    sender: mpsc::Sender<StoreCommand>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        let mut guard = match self.thread.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(handle) = guard.take() else {
            return;
        };
        if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
            error!("vocabulary store worker already gone: {err}");
        }
        if let Err(join_err) = handle.join() {
            error!("vocabulary store worker panicked: {join_err:?}");
        }
    }
}

/// Opens the SQLite file and brings it to the current schema.
fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        warn!("WAL journal unavailable for {}: {err}", path.display());
    }
    // Photo -> word object -> sentence cascades rely on this.
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;

    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

fn run_worker(mut conn: Connection, commands: mpsc::Receiver<StoreCommand>) {
    while let Ok(command) = commands.recv() {
        match command {
            StoreCommand::Execute(task) => task(&mut conn),
            StoreCommand::Shutdown => break,
        }
    }
    info!("vocabulary store worker stopped");
}

/// Handle to the vocabulary database.
///
/// The SQLite connection lives on a dedicated thread; every query is shipped
/// there as a closure and the result comes back over a oneshot channel, so
/// the handle is cheap to clone and safe to use from async code. Statements
/// therefore run strictly one at a time.
#[derive(Clone)]
pub struct Database {
    worker: Arc<WorkerHandle>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let path_for_thread = db_path.clone();

        let thread = thread::Builder::new()
            .name("vocasnap-db".into())
            .spawn(move || match open_connection(&path_for_thread) {
                Ok(conn) => {
                    if ready_tx.send(Ok(())).is_err() {
                        return;
                    }
                    run_worker(conn, command_rx);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Vocabulary store ready at {}", db_path.display());

        Ok(Self {
            worker: Arc::new(WorkerHandle {
                sender: command_tx,
                thread: Mutex::new(Some(thread)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Runs `task` on the database thread and waits for its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |conn| {
            // The caller may have given up waiting; the statement still ran.
            let _ = reply_tx.send(task(conn));
        }));

        self.worker
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }
}
