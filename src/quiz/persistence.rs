//! Background writes of "studied now" stamps.
//!
//! A correct answer must not wait on the database, so the session only
//! queues a [`MasteryUpdate`] here. One task applies the queue in order,
//! retrying transient failures; a write that keeps failing is logged and
//! dropped, which leaves the word looking overdue at the next session.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::store::VocabularyStore;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait before attempt `n + 1` is `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryUpdate {
    pub word: String,
    pub studied_at_ms: i64,
    /// Photo of the question that was answered; only used for logging.
    pub photo_id: i64,
    pub word_object_id: Option<i64>,
}

enum WriterCommand {
    Record(MasteryUpdate),
    Flush(oneshot::Sender<()>),
}

struct WriterTask {
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the mastery write queue. Clones share one worker.
#[derive(Clone)]
pub struct MasteryWriter {
    sender: mpsc::UnboundedSender<WriterCommand>,
    task: Arc<WriterTask>,
}

impl MasteryWriter {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn VocabularyStore>, policy: RetryPolicy) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(writer_loop(store, policy, receiver, cancel.clone()));

        Self {
            sender,
            task: Arc::new(WriterTask {
                cancel,
                handle: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Queues a write and returns immediately.
    pub fn submit(&self, update: MasteryUpdate) {
        if let Err(err) = self.sender.send(WriterCommand::Record(update)) {
            let WriterCommand::Record(update) = err.0 else {
                return;
            };
            log_error!(
                "mastery writer stopped; lost update for '{}' at {}",
                update.word,
                update.studied_at_ms
            );
        }
    }

    /// Resolves once every update submitted before this call was attempted.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.sender
            .send(WriterCommand::Flush(done_tx))
            .map_err(|_| anyhow!("mastery writer is not running"))?;
        done_rx
            .await
            .map_err(|_| anyhow!("mastery writer stopped before flushing"))
    }

    /// Applies what is already queued, then stops the worker.
    pub async fn shutdown(&self) -> Result<()> {
        self.task.cancel.cancel();

        let handle = {
            let mut guard = match self.task.handle.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.take()
        };

        match handle {
            Some(handle) => handle
                .await
                .context("mastery writer task failed to join"),
            None => Ok(()),
        }
    }
}

async fn writer_loop(
    store: Arc<dyn VocabularyStore>,
    policy: RetryPolicy,
    mut receiver: mpsc::UnboundedReceiver<WriterCommand>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            command = receiver.recv() => match command {
                Some(command) => run_command(store.as_ref(), policy, command).await,
                None => break,
            },
            _ = cancel.cancelled() => {
                receiver.close();
                while let Some(command) = receiver.recv().await {
                    run_command(store.as_ref(), policy, command).await;
                }
                break;
            }
        }
    }

    log_info!("mastery writer shutting down");
}

async fn run_command(store: &dyn VocabularyStore, policy: RetryPolicy, command: WriterCommand) {
    match command {
        WriterCommand::Record(update) => {
            apply_with_retry(store, policy, &update).await;
        }
        WriterCommand::Flush(done) => {
            let _ = done.send(());
        }
    }
}

/// Returns whether the write eventually landed.
async fn apply_with_retry(
    store: &dyn VocabularyStore,
    policy: RetryPolicy,
    update: &MasteryUpdate,
) -> bool {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match store
            .update_last_studied(&update.word, update.studied_at_ms)
            .await
        {
            Ok(0) => {
                // Nothing to retry: the word was deleted or never stored.
                log_warn!(
                    "marking '{}' studied touched no rows (photo {}, object {:?})",
                    update.word,
                    update.photo_id,
                    update.word_object_id
                );
                return false;
            }
            Ok(rows) => {
                log_debug!(
                    "marked '{}' studied at {} ({} rows, photo {}, object {:?})",
                    update.word,
                    update.studied_at_ms,
                    rows,
                    update.photo_id,
                    update.word_object_id
                );
                return true;
            }
            Err(err) if attempt < max_attempts => {
                log_warn!(
                    "attempt {attempt}/{max_attempts} to mark '{}' studied failed: {err:#}",
                    update.word
                );
                let backoff = policy.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            Err(err) => {
                log_error!(
                    "giving up marking '{}' studied after {max_attempts} attempts: {err:#}",
                    update.word
                );
            }
        }
    }

    false
}
