// src/infrastructure/mod.rs
pub mod config;
pub mod file_store;
pub mod http_store;
pub mod media;

pub use config::Config;
pub use file_store::FileNoteStore;
pub use http_store::HttpNoteStore;

use crate::application::{NoteLoader, NotePersistence};
use crate::domain::{DomainError, NotePayload, NoteRecord};

/// Store selected at startup: local files or a remote notes API.
#[derive(Debug, Clone)]
pub enum NoteBackend {
    File(FileNoteStore),
    Http(HttpNoteStore),
}

impl NoteBackend {
    pub fn describe(&self) -> String {
        match self {
            NoteBackend::File(store) => format!("file:{}", store.dir().display()),
            NoteBackend::Http(store) => format!("http:{}", store.note_url("")),
        }
    }
}

impl NoteLoader for NoteBackend {
    async fn load_note(&self, id: &str) -> Result<NoteRecord, DomainError> {
        match self {
            NoteBackend::File(store) => store.load_note(id).await,
            NoteBackend::Http(store) => store.load_note(id).await,
        }
    }
}

impl NotePersistence for NoteBackend {
    async fn replace_note(&self, id: &str, payload: &NotePayload) -> Result<(), DomainError> {
        match self {
            NoteBackend::File(store) => store.replace_note(id, payload).await,
            NoteBackend::Http(store) => store.replace_note(id, payload).await,
        }
    }
}
