//! Background autosave worker.
//!
//! [`Autosaver::spawn`] starts a task that owns an [`AutosaveScheduler`] and a
//! [`SaveSink`]. Callers send debounced or immediate saves over an unbounded
//! channel; the worker writes due payloads and flushes on shutdown.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use sage_core::entities::WizardData;

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::projects::ProjectStore;
use crate::scheduler::{AutosaveScheduler, TokioClock};

/// Destination for autosaved payloads.
pub trait SaveSink<P>: Send + 'static {
    fn save(&mut self, payload: P) -> Result<(), StoreError>;
}

/// The payload the wizard autosaves: which project, and its snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSnapshot {
    pub project_id: String,
    pub data: WizardData,
}

impl<S: KeyValueStore> SaveSink<ProjectSnapshot> for ProjectStore<S> {
    fn save(&mut self, payload: ProjectSnapshot) -> Result<(), StoreError> {
        self.quick_save(&payload.project_id, payload.data).map(|_| ())
    }
}

enum Command<P> {
    Debounced(P),
    Immediate(P, oneshot::Sender<Result<(), StoreError>>),
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

/// Handle to the autosave worker.
pub struct Autosaver<P> {
    tx: mpsc::UnboundedSender<Command<P>>,
    task: JoinHandle<()>,
}

impl<P: Send + 'static> Autosaver<P> {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn<K: SaveSink<P>>(sink: K, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = AutosaveScheduler::new(TokioClock, window);
        let task = tokio::spawn(run(scheduler, sink, rx));
        Self { tx, task }
    }

    /// Queue a debounced save.
    pub fn debounced(&self, payload: P) -> Result<(), StoreError> {
        self.tx
            .send(Command::Debounced(payload))
            .map_err(|_| StoreError::AutosaverStopped)
    }

    /// Write `payload` now, cancelling any pending debounced save, and wait
    /// for the write to finish.
    pub async fn immediate(&self, payload: P) -> Result<(), StoreError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Immediate(payload, ack))
            .map_err(|_| StoreError::AutosaverStopped)?;
        done.await.map_err(|_| StoreError::AutosaverStopped)?
    }

    /// Write the pending debounced payload, if any, without waiting for its
    /// deadline.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack))
            .map_err(|_| StoreError::AutosaverStopped)?;
        done.await.map_err(|_| StoreError::AutosaverStopped)?
    }

    /// Flush and stop the worker.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        let result = self.flush().await;
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "autosave worker ended abnormally");
        }
        result
    }
}

async fn run<P, K: SaveSink<P>>(
    mut scheduler: AutosaveScheduler<P, TokioClock>,
    mut sink: K,
    mut rx: mpsc::UnboundedReceiver<Command<P>>,
) {
    loop {
        let deadline = scheduler.next_deadline();
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Debounced(payload)) => scheduler.schedule_debounced(payload),
                Some(Command::Immediate(payload, ack)) => {
                    let payload = scheduler.flush_immediate(payload);
                    let _ = ack.send(write(&mut sink, payload));
                }
                Some(Command::Flush(ack)) => {
                    let result = scheduler
                        .take_pending()
                        .map_or(Ok(()), |payload| write(&mut sink, payload));
                    let _ = ack.send(result);
                }
                None => {
                    if let Some(payload) = scheduler.take_pending() {
                        let _ = write(&mut sink, payload);
                    }
                    break;
                }
            },
            () = sleep_until(deadline), if deadline.is_some() => {
                if let Some(payload) = scheduler.take_due() {
                    let _ = write(&mut sink, payload);
                }
            }
        }
    }
    tracing::debug!("autosave worker stopped");
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    }
}

fn write<P, K: SaveSink<P>>(sink: &mut K, payload: P) -> Result<(), StoreError> {
    let result = sink.save(payload);
    if let Err(e) = &result {
        tracing::warn!(error = %e, "autosave failed");
    }
    result
}
