// src/infrastructure/http_store.rs
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::application::{NoteLoader, NotePersistence};
use crate::constants::NOTES_API_PATH;
use crate::domain::{DomainError, NotePayload, NoteRecord};

/// Notes served by a remote notes API.
///
/// `GET {base}/api/notes/{id}` loads, `PATCH` with the JSON payload replaces.
#[derive(Debug, Clone)]
pub struct HttpNoteStore {
    client: Client,
    base_url: String,
}

fn network(e: reqwest::Error) -> DomainError {
    DomainError::Network(e.to_string())
}

fn http(status: StatusCode, body: String, ctx: &str) -> DomainError {
    DomainError::Persistence(format!("{ctx} ({status}): {body}"))
}

impl HttpNoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn note_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, NOTES_API_PATH, id)
    }
}

impl NoteLoader for HttpNoteStore {
    #[instrument(level = "debug", skip(self))]
    async fn load_note(&self, id: &str) -> Result<NoteRecord, DomainError> {
        let url = self.note_url(id);
        let res = self.client.get(&url).send().await.map_err(network)?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::NoteNotFound(id.to_string()));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(http(status, body, "Load failed"));
        }
        debug!(%status, "note fetched");
        res.json()
            .await
            .map_err(|e| DomainError::MalformedDocument(e.to_string()))
    }
}

impl NotePersistence for HttpNoteStore {
    #[instrument(level = "debug", skip(self, payload))]
    async fn replace_note(&self, id: &str, payload: &NotePayload) -> Result<(), DomainError> {
        let url = self.note_url(id);
        let res = self
            .client
            .patch(&url)
            .json(payload)
            .send()
            .await
            .map_err(network)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(http(status, body, "Save failed"));
        }
        debug!(%status, "note replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_base_with_trailing_slash_when_building_url_then_joins_cleanly() {
        let store = HttpNoteStore::new("http://localhost:3000/");

        assert_eq!(store.note_url("n-1"), "http://localhost:3000/api/notes/n-1");
    }

    #[tokio::test]
    async fn given_unreachable_server_when_saving_then_returns_network_error() {
        let store = HttpNoteStore::new("http://127.0.0.1:9");
        let payload = NotePayload {
            title: "t".into(),
            content: crate::domain::template::getting_started(),
            notebook_id: "nb".into(),
        };

        let result = store.replace_note("n-1", &payload).await;

        assert!(matches!(result, Err(DomainError::Network(_))));
    }
}
