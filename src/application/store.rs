// src/application/store.rs
use std::future::Future;

use tracing::debug;

use crate::domain::{DomainError, Note, NotePayload, NoteRecord};

/// Upstream operation returning a note as stored.
pub trait NoteLoader: Send + Sync + 'static {
    fn load_note(&self, id: &str) -> impl Future<Output = Result<NoteRecord, DomainError>> + Send;
}

/// Idempotent "replace note" boundary with last-write-wins semantics.
///
/// Must accept content identical to the previous call.
pub trait NotePersistence: Send + Sync + 'static {
    fn replace_note(
        &self,
        id: &str,
        payload: &NotePayload,
    ) -> impl Future<Output = Result<(), DomainError>> + Send;
}

/// Loads a note and seeds empty content with the default template.
pub async fn open_note<L: NoteLoader>(loader: &L, id: &str) -> Result<Note, DomainError> {
    let record = loader.load_note(id).await?;
    debug!(note_id = id, has_content = record.content.is_some(), "note loaded");
    Note::from_record(record)
}
