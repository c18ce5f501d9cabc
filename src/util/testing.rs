// src/util/testing.rs

use anyhow::Result;
use std::collections::HashMap;
use std::env;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{NoteLoader, NotePersistence};
use crate::domain::{DomainError, NotePayload, NoteRecord};

/// One recorded `replace_note` call.
#[derive(Debug, Clone)]
pub struct SaveCall {
    pub note_id: String,
    pub payload: NotePayload,
    /// Runtime clock when the call started; paused-clock tests compare these.
    pub at: Instant,
}

/// Shared in-memory store for testing sessions and use cases.
///
/// Records every `replace_note` call; saves can be slowed down or made to
/// fail.
///
/// # Examples
///
/// ```
/// use notedit::util::testing::MockNoteStore;
/// use notedit::domain::NoteRecord;
///
/// let store = MockNoteStore::builder()
///     .with_note(NoteRecord {
///         id: "n1".to_string(),
///         title: "Plan".to_string(),
///         content: None,
///         notebook_id: Some("nb".to_string()),
///     })
///     .with_failing_saves()
///     .build();
/// assert_eq!(store.save_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockNoteStore {
    notes: Mutex<HashMap<String, NoteRecord>>,
    calls: Mutex<Vec<SaveCall>>,
    fail_saves: bool,
    save_delay: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockNoteStore {
    pub fn builder() -> MockNoteStoreBuilder {
        MockNoteStoreBuilder::new()
    }

    pub fn saves(&self) -> Vec<SaveCall> {
        lock(&self.calls).clone()
    }

    pub fn save_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn last_save(&self) -> Option<SaveCall> {
        lock(&self.calls).last().cloned()
    }

    /// Stored record, reflecting successful saves.
    pub fn record(&self, id: &str) -> Option<NoteRecord> {
        lock(&self.notes).get(id).cloned()
    }
}

impl NoteLoader for MockNoteStore {
    async fn load_note(&self, id: &str) -> Result<NoteRecord, DomainError> {
        self.record(id)
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))
    }
}

impl NotePersistence for MockNoteStore {
    async fn replace_note(&self, id: &str, payload: &NotePayload) -> Result<(), DomainError> {
        lock(&self.calls).push(SaveCall {
            note_id: id.to_string(),
            payload: payload.clone(),
            at: Instant::now(),
        });
        if !self.save_delay.is_zero() {
            tokio::time::sleep(self.save_delay).await;
        }
        if self.fail_saves {
            return Err(DomainError::Network("connection refused".to_string()));
        }
        lock(&self.notes).insert(
            id.to_string(),
            NoteRecord {
                id: id.to_string(),
                title: payload.title.clone(),
                content: Some(payload.content.to_value()),
                notebook_id: Some(payload.notebook_id.clone()),
            },
        );
        Ok(())
    }
}

/// Builder for MockNoteStore
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockNoteStoreBuilder {
    notes: HashMap<String, NoteRecord>,
    fail_saves: bool,
    save_delay: Duration,
}

impl MockNoteStoreBuilder {
    pub fn new() -> Self {
        Self {
            notes: HashMap::new(),
            fail_saves: false,
            save_delay: Duration::ZERO,
        }
    }

    /// Add a note that can be retrieved by load_note
    pub fn with_note(mut self, record: NoteRecord) -> Self {
        self.notes.insert(record.id.clone(), record);
        self
    }

    /// Make every replace_note call fail after being recorded
    pub fn with_failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Keep each replace_note call in flight for `delay`
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }

    pub fn build(self) -> MockNoteStore {
        MockNoteStore {
            notes: Mutex::new(self.notes),
            calls: Mutex::new(Vec::new()),
            fail_saves: self.fail_saves,
            save_delay: self.save_delay,
        }
    }
}

impl Default for MockNoteStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "rustls", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template;

    fn record(id: &str) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            title: "Plan".to_string(),
            content: None,
            notebook_id: Some("nb".to_string()),
        }
    }

    fn payload(title: &str) -> NotePayload {
        NotePayload {
            title: title.to_string(),
            content: template::getting_started(),
            notebook_id: "nb".to_string(),
        }
    }

    #[tokio::test]
    async fn given_note_added_when_loading_then_returns_record() {
        let store = MockNoteStore::builder().with_note(record("n1")).build();

        let result = store.load_note("n1").await.expect("Note should exist");

        assert_eq!(result, record("n1"));
    }

    #[tokio::test]
    async fn given_no_note_when_loading_then_returns_not_found() {
        let store = MockNoteStore::builder().build();

        let result = store.load_note("n9").await;

        assert!(matches!(result, Err(DomainError::NoteNotFound(id)) if id == "n9"));
    }

    #[tokio::test]
    async fn given_save_when_replacing_then_records_call_and_updates_note() {
        let store = MockNoteStore::builder().with_note(record("n1")).build();

        store.replace_note("n1", &payload("New")).await.unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.last_save().unwrap().payload.title, "New");
        assert_eq!(store.record("n1").unwrap().title, "New");
    }

    #[tokio::test]
    async fn given_failing_saves_when_replacing_then_records_call_and_fails() {
        let store = MockNoteStore::builder()
            .with_note(record("n1"))
            .with_failing_saves()
            .build();

        let result = store.replace_note("n1", &payload("New")).await;

        assert!(result.is_err());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.record("n1").unwrap().title, "Plan");
    }
}
