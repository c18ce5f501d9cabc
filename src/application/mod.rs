// src/application/mod.rs
pub mod autosave;
pub mod commands;
pub mod diff_guard;
pub mod dispatcher;
pub mod history;
pub mod projector;
pub mod scheduler;
pub mod session;
pub mod store;

pub use autosave::{AutosaveHandle, AutosaveSettings, SaveEvent, SaveSnapshot};
pub use diff_guard::{ContentDiffGuard, Fingerprint};
pub use dispatcher::{CommandDispatcher, CommandOutcome};
pub use projector::{project, project_document, EditorState, ToolbarAction};
pub use scheduler::{SaveScheduler, SaveState};
pub use session::EditingSession;
pub use store::{open_note, NoteLoader, NotePersistence};
