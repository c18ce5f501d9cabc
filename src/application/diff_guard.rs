// src/application/diff_guard.rs
use serde::Serialize;
use tracing::trace;

use crate::domain::Document;

/// Serialized snapshot of what a save would send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

#[derive(Serialize)]
struct FingerprintView<'a> {
    title: &'a str,
    content: &'a Document,
}

impl Fingerprint {
    /// Covers title and content, so a title-only edit is never vetoed.
    pub fn of(title: &str, content: &Document) -> Self {
        let view = FingerprintView { title, content };
        Self(serde_json::to_string(&view).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Suppresses saves whose serialization equals the last one handed to the
/// persistence boundary.
#[derive(Debug, Clone)]
pub struct ContentDiffGuard {
    last_persisted: Fingerprint,
}

impl ContentDiffGuard {
    /// Seeded with the state the note was loaded in.
    pub fn seeded(title: &str, content: &Document) -> Self {
        Self {
            last_persisted: Fingerprint::of(title, content),
        }
    }

    /// Returns `true` when a save should go out and records the fingerprint
    /// before the call is issued, whatever its outcome.
    pub fn admit(&mut self, candidate: Fingerprint) -> bool {
        if candidate == self.last_persisted {
            trace!(bytes = candidate.len(), "content unchanged since last save");
            return false;
        }
        self.last_persisted = candidate;
        true
    }

    pub fn last_persisted(&self) -> &Fingerprint {
        &self.last_persisted
    }
}
