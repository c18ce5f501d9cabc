// src/infrastructure/file_store.rs
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::application::{NoteLoader, NotePersistence};
use crate::constants::NOTE_FILE_EXTENSION;
use crate::domain::{DomainError, NotePayload, NoteRecord};

/// Notes stored as one JSON file per note in a directory.
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    dir: PathBuf,
}

fn io_error(context: &str, path: &Path, e: impl std::fmt::Display) -> DomainError {
    DomainError::Persistence(format!("{context} {}: {e}", path.display()))
}

impl FileNoteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn note_path(&self, id: &str) -> Result<PathBuf, DomainError> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.starts_with('.');
        if !valid {
            return Err(DomainError::Persistence(format!("invalid note id: {id:?}")));
        }
        Ok(self.dir.join(format!("{id}.{NOTE_FILE_EXTENSION}")))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn read_record(&self, id: &str) -> Result<NoteRecord, DomainError> {
        let path = self.note_path(id)?;
        if !path.exists() {
            return Err(DomainError::NoteNotFound(id.to_string()));
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| io_error("Failed to read", &path, e))?;
        let record: NoteRecord = serde_json::from_str(&content)
            .map_err(|e| DomainError::MalformedDocument(format!("{}: {e}", path.display())))?;
        if record.id != id {
            return Err(DomainError::MalformedDocument(format!(
                "{} holds note {}",
                path.display(),
                record.id
            )));
        }
        Ok(record)
    }

    /// Atomically replaces the note file.
    #[instrument(level = "debug", skip(self, record), fields(note_id = %record.id))]
    pub fn write_record(&self, record: &NoteRecord) -> Result<(), DomainError> {
        let path = self.note_path(&record.id)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| io_error("Failed to create", &self.dir, e))?;

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| io_error("Failed to create temp file in", &self.dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| io_error("Failed to write", tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| io_error("Failed to persist", &path, e.error))?;

        debug!(bytes = json.len(), ?path, "note written");
        Ok(())
    }

    /// Ids of all stored notes, sorted.
    pub fn list_ids(&self) -> Result<Vec<String>, DomainError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| io_error("Failed to list", &self.dir, e))?;
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(NOTE_FILE_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl NoteLoader for FileNoteStore {
    async fn load_note(&self, id: &str) -> Result<NoteRecord, DomainError> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.read_record(&id))
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?
    }
}

impl NotePersistence for FileNoteStore {
    async fn replace_note(&self, id: &str, payload: &NotePayload) -> Result<(), DomainError> {
        let store = self.clone();
        let record = NoteRecord {
            id: id.to_string(),
            title: payload.title.clone(),
            content: Some(payload.content.to_value()),
            notebook_id: Some(payload.notebook_id.clone()),
        };
        tokio::task::spawn_blocking(move || store.write_record(&record))
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            title: "Title".to_string(),
            content: None,
            notebook_id: Some("nb".to_string()),
        }
    }

    #[test]
    fn given_written_record_when_reading_then_returns_same_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileNoteStore::new(temp_dir.path().join("notes"));

        store.write_record(&record("a1")).unwrap();
        let loaded = store.read_record("a1").unwrap();

        assert_eq!(loaded, record("a1"));
        assert_eq!(store.list_ids().unwrap(), vec!["a1".to_string()]);
    }

    #[test]
    fn given_missing_note_when_reading_then_returns_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileNoteStore::new(temp_dir.path());

        let result = store.read_record("nope");

        assert_eq!(result, Err(DomainError::NoteNotFound("nope".to_string())));
    }

    #[test]
    fn given_path_like_id_when_resolving_then_rejects_it() {
        let store = FileNoteStore::new("/tmp");

        assert!(store.note_path("../etc/passwd").is_err());
        assert!(store.note_path("").is_err());
        assert!(store.note_path("note-1").is_ok());
    }
}
