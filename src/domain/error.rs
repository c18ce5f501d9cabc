// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Note {0} has no notebook")]
    MissingNotebook(String),
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid script at line {line}: {reason}")]
    InvalidScript { line: usize, reason: String },
}
