// src/application/autosave.rs
//! Background task that turns change notifications into debounced saves.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};

use crate::application::diff_guard::{ContentDiffGuard, Fingerprint};
use crate::application::scheduler::SaveScheduler;
use crate::application::store::NotePersistence;
use crate::constants::{DEFAULT_DEBOUNCE_MS, SAVE_EVENT_CAPACITY};
use crate::domain::{Document, DomainError, NotePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    /// Quiet period before a pending save is issued.
    pub debounce: Duration,
    /// Whether closing a session flushes a pending save.
    pub flush_on_close: bool,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            flush_on_close: true,
        }
    }
}

/// Note state captured at the time of a change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSnapshot {
    pub title: String,
    pub content: Document,
    pub notebook_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    Saved { note_id: String, bytes: usize },
    /// Vetoed by the diff guard.
    Skipped { note_id: String },
    /// Not sent because a required field is missing.
    Rejected { note_id: String, reason: String },
    Failed { note_id: String, error: String },
}

#[derive(Debug)]
enum Message {
    Changed(SaveSnapshot),
    Flush(oneshot::Sender<()>),
    Close {
        flush: bool,
        done: oneshot::Sender<()>,
    },
}

/// Owner side of one note's autosave task.
///
/// Dropping the handle disconnects the task, which makes a best-effort save
/// of any pending change and exits.
#[derive(Debug)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<Message>,
    events: broadcast::Sender<SaveEvent>,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Spawns the task on the current tokio runtime.
    pub fn spawn<P: NotePersistence>(
        note_id: impl Into<String>,
        guard: ContentDiffGuard,
        persistence: Arc<P>,
        settings: AutosaveSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(SAVE_EVENT_CAPACITY);
        let worker = Worker {
            note_id: note_id.into(),
            persistence,
            guard,
            scheduler: SaveScheduler::new(settings.debounce),
            latest: None,
            events: events.clone(),
            deferred: VecDeque::new(),
            detached: false,
        };
        let task = tokio::spawn(worker.run(rx));
        Self {
            tx,
            events,
            task: Some(task),
        }
    }

    /// Reports a change; never fails the caller.
    pub fn notify(&self, snapshot: SaveSnapshot) {
        if self.tx.send(Message::Changed(snapshot)).is_err() {
            warn!("autosave task is gone, change not scheduled");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.events.subscribe()
    }

    /// Issues any pending save now and waits until the task is idle.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Message::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    /// Stops the task, flushing first when `flush` is set. An in-flight save
    /// always completes.
    pub async fn close(mut self, flush: bool) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Message::Close { flush, done }).is_ok() {
            let _ = wait.await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "autosave task ended abnormally");
            }
        }
    }
}

enum Wake {
    Message(Message),
    Deadline,
    Disconnected,
}

enum Prepared {
    Skip,
    Reject(String),
    Send { payload: NotePayload, bytes: usize },
}

struct Worker<P> {
    note_id: String,
    persistence: Arc<P>,
    guard: ContentDiffGuard,
    scheduler: SaveScheduler,
    latest: Option<SaveSnapshot>,
    events: broadcast::Sender<SaveEvent>,
    /// Flush and close requests received while a save was in flight.
    deferred: VecDeque<Message>,
    detached: bool,
}

impl<P: NotePersistence> Worker<P> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        debug!(note_id = %self.note_id, "autosave started");
        loop {
            match self.next_wake(&mut rx).await {
                Wake::Deadline => {
                    if self.scheduler.on_deadline(Instant::now()) {
                        self.save_cycle(&mut rx).await;
                    }
                }
                Wake::Message(Message::Changed(snapshot)) => self.on_change(snapshot),
                Wake::Message(Message::Flush(done)) => {
                    self.flush(&mut rx).await;
                    let _ = done.send(());
                }
                Wake::Message(Message::Close { flush, done }) => {
                    if flush {
                        self.flush(&mut rx).await;
                    } else if !self.scheduler.is_idle() {
                        info!(note_id = %self.note_id, "closing with unsaved changes");
                    }
                    let _ = done.send(());
                    break;
                }
                Wake::Disconnected => {
                    debug!(note_id = %self.note_id, "handle dropped, saving pending changes");
                    self.flush(&mut rx).await;
                    break;
                }
            }
        }
        debug!(note_id = %self.note_id, "autosave stopped");
    }

    async fn next_wake(&mut self, rx: &mut mpsc::UnboundedReceiver<Message>) -> Wake {
        if let Some(message) = self.deferred.pop_front() {
            return Wake::Message(message);
        }
        if self.detached {
            return Wake::Disconnected;
        }
        let deadline = self.scheduler.deadline();
        tokio::select! {
            message = rx.recv() => match message {
                Some(message) => Wake::Message(message),
                None => Wake::Disconnected,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Deadline,
        }
    }

    fn on_change(&mut self, snapshot: SaveSnapshot) {
        self.latest = Some(snapshot);
        self.scheduler.on_change(Instant::now());
        trace!(note_id = %self.note_id, state = %self.scheduler.state(), "change received");
    }

    async fn flush(&mut self, rx: &mut mpsc::UnboundedReceiver<Message>) {
        while self.scheduler.force() {
            self.save_cycle(rx).await;
        }
    }

    async fn save_cycle(&mut self, rx: &mut mpsc::UnboundedReceiver<Message>) {
        let prepared = match self.latest.clone() {
            Some(snapshot) => self.prepare(snapshot),
            None => Prepared::Skip,
        };
        let event = match prepared {
            Prepared::Skip => {
                debug!(note_id = %self.note_id, "save skipped, content unchanged");
                SaveEvent::Skipped {
                    note_id: self.note_id.clone(),
                }
            }
            Prepared::Reject(reason) => {
                warn!(note_id = %self.note_id, %reason, "save rejected locally");
                SaveEvent::Rejected {
                    note_id: self.note_id.clone(),
                    reason,
                }
            }
            Prepared::Send { payload, bytes } => match self.await_save(&payload, rx).await {
                Ok(()) => {
                    info!(note_id = %self.note_id, bytes, "note saved");
                    SaveEvent::Saved {
                        note_id: self.note_id.clone(),
                        bytes,
                    }
                }
                Err(e) => {
                    warn!(note_id = %self.note_id, error = %e, "save failed, not retrying");
                    SaveEvent::Failed {
                        note_id: self.note_id.clone(),
                        error: e.to_string(),
                    }
                }
            },
        };
        self.scheduler.on_settled(Instant::now());
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn prepare(&mut self, snapshot: SaveSnapshot) -> Prepared {
        let Some(notebook_id) = snapshot.notebook_id.filter(|id| !id.is_empty()) else {
            return Prepared::Reject(DomainError::MissingNotebook(self.note_id.clone()).to_string());
        };
        let fingerprint = Fingerprint::of(&snapshot.title, &snapshot.content);
        let bytes = fingerprint.len();
        if !self.guard.admit(fingerprint) {
            return Prepared::Skip;
        }
        Prepared::Send {
            payload: NotePayload {
                title: snapshot.title,
                content: snapshot.content,
                notebook_id,
            },
            bytes,
        }
    }

    /// Awaits the save while still taking change notifications.
    async fn await_save(
        &mut self,
        payload: &NotePayload,
        rx: &mut mpsc::UnboundedReceiver<Message>,
    ) -> Result<(), DomainError> {
        let persistence = Arc::clone(&self.persistence);
        let note_id = self.note_id.clone();
        let save = persistence.replace_note(&note_id, payload);
        tokio::pin!(save);
        loop {
            tokio::select! {
                result = &mut save => return result,
                message = rx.recv(), if !self.detached => match message {
                    Some(Message::Changed(snapshot)) => self.on_change(snapshot),
                    Some(other) => self.deferred.push_back(other),
                    None => self.detached = true,
                },
            }
        }
    }
}
