use anyhow::{Context, Result};
use notedit::domain::NoteRecord;
use notedit::infrastructure::FileNoteStore;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture for working with a temporary notes directory
#[allow(dead_code)]
pub struct TestStore {
    _temp_dir: TempDir,
    pub notes_dir: PathBuf,
    pub store: FileNoteStore,
}

#[allow(dead_code)]
impl TestStore {
    /// Create an empty notes directory
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let notes_dir = temp_dir.path().join("notes");
        Ok(Self {
            store: FileNoteStore::new(&notes_dir),
            notes_dir,
            _temp_dir: temp_dir,
        })
    }

    /// Create a notes directory holding the sample notes
    pub fn with_samples() -> Result<Self> {
        let test_store = Self::new()?;
        for record in sample_notes::all() {
            test_store.store.write_record(&record)?;
        }
        Ok(test_store)
    }

    /// Write an edit script next to the notes directory
    pub fn write_script(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self
            .notes_dir
            .parent()
            .context("notes dir has no parent")?
            .join(name);
        std::fs::write(&path, content).context("Failed to write script")?;
        Ok(path)
    }

    pub fn read(&self, id: &str) -> Result<NoteRecord> {
        Ok(self.store.read_record(id)?)
    }
}

/// Sample notes used across integration tests
#[allow(dead_code)]
pub mod sample_notes {
    use super::*;

    pub const PLAIN: &str = "plain";
    pub const TEMPLATE: &str = "template";
    pub const TASKS: &str = "tasks";
    pub const ORPHAN: &str = "orphan";
    pub const NONEXISTENT: &str = "nonexistent";

    pub const NOTEBOOK: &str = "nb-1";

    pub fn plain_content() -> Value {
        json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Plan"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Hello "},
                    {"type": "text", "text": "world", "marks": [{"type": "bold"}]}
                ]}
            ]
        })
    }

    pub fn tasks_content() -> Value {
        json!({
            "type": "doc",
            "content": [
                {"type": "taskList", "content": [
                    {"type": "taskItem", "attrs": {"checked": true},
                     "content": [{"type": "paragraph", "content": [{"type": "text", "text": "done"}]}]},
                    {"type": "taskItem", "attrs": {"checked": false},
                     "content": [{"type": "paragraph", "content": [{"type": "text", "text": "todo"}]}]}
                ]}
            ]
        })
    }

    pub fn record(id: &str, title: &str, content: Option<Value>, notebook: Option<&str>) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            title: title.to_string(),
            content,
            notebook_id: notebook.map(str::to_string),
        }
    }

    pub fn all() -> Vec<NoteRecord> {
        vec![
            record(PLAIN, "Plan", Some(plain_content()), Some(NOTEBOOK)),
            record(TEMPLATE, "", None, Some(NOTEBOOK)),
            record(TASKS, "Chores", Some(tasks_content()), Some(NOTEBOOK)),
            record(ORPHAN, "Loose", Some(plain_content()), None),
        ]
    }
}
