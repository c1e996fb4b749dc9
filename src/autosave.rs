//! Debounced persistence of the working document.
//!
//! Edits call [`AutosaveController::schedule`] with the document as it is at
//! that moment. A background task keeps only the newest snapshot and writes
//! it once no new snapshot has arrived for the idle interval. `flush` writes
//! immediately, `cancel` drops whatever is pending.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::identity::StorageKey;
use crate::storage::ContentStore;
use crate::types::ContentDocument;

pub const DEFAULT_IDLE: Duration = Duration::from_millis(1000);

/// Non-blocking save notice for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Pending,
    Saved,
    Failed(String),
}

/// What to do with a pending write when the controller shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPolicy {
    Flush,
    Discard,
}

enum Command {
    Schedule(Box<ContentDocument>),
    Flush(oneshot::Sender<Result<bool>>),
    Cancel,
    Shutdown,
}

pub struct AutosaveController {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    worker: Option<JoinHandle<()>>,
}

impl AutosaveController {
    /// Spawn the write task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn ContentStore>, key: StorageKey, idle: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let worker = tokio::spawn(run(rx, store, key, idle, status_tx));
        Self { tx, status, worker: Some(worker) }
    }

    /// Replace the pending snapshot and restart the idle timer. The document
    /// is cloned here, so later edits cannot leak into this snapshot.
    pub fn schedule(&self, doc: &ContentDocument) {
        if self.tx.send(Command::Schedule(Box::new(doc.clone()))).is_err() {
            tracing::warn!("autosave worker stopped; edit kept in memory only");
        }
    }

    /// Write the pending snapshot now. `Ok(false)` if nothing was pending.
    pub async fn flush(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Flush(reply)).map_err(|_| anyhow!("autosave worker stopped"))?;
        rx.await.map_err(|_| anyhow!("autosave worker stopped"))?
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    pub fn status(&self) -> watch::Receiver<SaveStatus> { self.status.clone() }

    /// Stop the write task. With `Flush` the pending snapshot is written first
    /// and a write failure is returned; with `Discard` it is dropped.
    pub async fn shutdown(mut self, policy: PendingPolicy) -> Result<()> {
        let flushed = match policy {
            PendingPolicy::Flush => self.flush().await.map(|_| ()),
            PendingPolicy::Discard => {
                self.cancel();
                Ok(())
            }
        };
        let _ = self.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
        flushed
    }
}

impl Drop for AutosaveController {
    // Dropping without shutdown discards any pending snapshot.
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Command>,
    store: Arc<dyn ContentStore>,
    key: StorageKey,
    idle: Duration,
    status: watch::Sender<SaveStatus>,
) {
    let mut pending: Option<ContentDocument> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Schedule(doc)) => {
                    pending = Some(*doc);
                    deadline = Some(Instant::now() + idle);
                    status.send_replace(SaveStatus::Pending);
                }
                Some(Command::Flush(reply)) => {
                    deadline = None;
                    let result = match pending.take() {
                        Some(doc) => write(store.as_ref(), &key, &doc, &status).await.map(|_| true),
                        None => Ok(false),
                    };
                    let _ = reply.send(result);
                }
                Some(Command::Cancel) => {
                    if pending.take().is_some() {
                        tracing::debug!(key = %key, "pending autosave discarded");
                    }
                    deadline = None;
                    status.send_replace(SaveStatus::Idle);
                }
                Some(Command::Shutdown) | None => break,
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                if let Some(doc) = pending.take() {
                    tracing::debug!(key = %key, "idle interval elapsed, autosaving");
                    // failure is already reported through `status`
                    let _ = write(store.as_ref(), &key, &doc, &status).await;
                }
            }
        }
    }
}

async fn write(store: &dyn ContentStore, key: &StorageKey, doc: &ContentDocument, status: &watch::Sender<SaveStatus>) -> Result<()> {
    match store.save(key, doc).await {
        Ok(()) => {
            status.send_replace(SaveStatus::Saved);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %format!("{e:#}"), "content write failed; edits remain in memory");
            status.send_replace(SaveStatus::Failed(format!("{e:#}")));
            Err(e)
        }
    }
}
