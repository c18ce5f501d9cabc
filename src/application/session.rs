// src/application/session.rs
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::application::autosave::{AutosaveHandle, AutosaveSettings, SaveEvent, SaveSnapshot};
use crate::application::diff_guard::ContentDiffGuard;
use crate::application::dispatcher::{CommandDispatcher, CommandOutcome};
use crate::application::projector::{project, EditorState};
use crate::application::store::NotePersistence;
use crate::domain::{Document, EditorCommand, Note, Selection};

/// One open note: live document, title and its autosave task.
///
/// Must be opened inside a tokio runtime.
#[derive(Debug)]
pub struct EditingSession {
    note_id: String,
    title: String,
    notebook_id: Option<String>,
    dispatcher: CommandDispatcher,
    autosave: AutosaveHandle,
    settings: AutosaveSettings,
}

impl EditingSession {
    #[instrument(level = "debug", skip_all, fields(note_id = %note.id))]
    pub fn open<P: NotePersistence>(
        note: Note,
        persistence: Arc<P>,
        settings: AutosaveSettings,
    ) -> Self {
        let guard = ContentDiffGuard::seeded(&note.title, &note.content);
        let autosave = AutosaveHandle::spawn(note.id.clone(), guard, persistence, settings);
        debug!(debounce_ms = settings.debounce.as_millis() as u64, "session opened");
        Self {
            note_id: note.id,
            title: note.title,
            notebook_id: note.notebook_id,
            dispatcher: CommandDispatcher::new(note.content),
            autosave,
            settings,
        }
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn document(&self) -> &Document {
        self.dispatcher.document()
    }

    pub fn selection(&self) -> Selection {
        self.dispatcher.selection()
    }

    pub fn state(&self) -> EditorState {
        project(&self.dispatcher)
    }

    pub fn can_apply(&self, command: &EditorCommand) -> bool {
        self.dispatcher.can_apply(command)
    }

    /// Applies a command; a model change schedules exactly one notification.
    pub fn apply(&mut self, command: EditorCommand) -> CommandOutcome {
        let outcome = self.dispatcher.apply(command);
        if outcome.changed {
            self.notify();
        }
        outcome
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.notify();
        }
    }

    pub fn select(&mut self, selection: Selection) {
        self.dispatcher.select(selection);
    }

    /// Sends a change notification for the current state, as editor surfaces
    /// do once on mount.
    pub fn touch(&self) {
        self.notify();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.autosave.subscribe()
    }

    pub async fn flush(&self) {
        self.autosave.flush().await;
    }

    /// Closes the session, flushing a pending save when configured to.
    pub async fn close(self) -> Note {
        debug!(note_id = %self.note_id, flush = self.settings.flush_on_close, "closing session");
        self.autosave.close(self.settings.flush_on_close).await;
        Note {
            id: self.note_id,
            title: self.title,
            content: self.dispatcher.document().clone(),
            notebook_id: self.notebook_id,
        }
    }

    fn notify(&self) {
        self.autosave.notify(SaveSnapshot {
            title: self.title.clone(),
            content: self.dispatcher.document().clone(),
            notebook_id: self.notebook_id.clone(),
        });
    }
}
