//! HTTP note backend against a REST-style collection.
//!
//! Implements both halves of the persistence interface: the CRUD
//! operations of [`NoteBackend`] and the SSE-style change feed of
//! [`ChangeFeed`]. The feed carries no payload diffs; every `data:` line
//! is a bare `{event_type, table}` notification telling consumers to
//! reload.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use loci_core::defaults::{ENV_NOTES_BASE_URL, ENV_NOTES_TIMEOUT_SECS, ENV_NOTES_TOKEN};
use loci_core::{ChangeEvent, ChangeFeed, Error, NewNote, Note, NoteBackend, Result};

/// Default note collection endpoint.
pub const DEFAULT_NOTES_URL: &str = loci_core::defaults::NOTES_URL;

/// Timeout for note backend requests (seconds).
pub const NOTES_TIMEOUT_SECS: u64 = loci_core::defaults::NOTES_TIMEOUT_SECS;

/// REST client for the remote note collection.
pub struct HttpNoteBackend {
    client: Client,
    /// Separate client for the change feed: a total request timeout would
    /// sever the long-lived stream, so this one only bounds the connect.
    feed_client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpNoteBackend {
    /// Create a backend with default settings.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_NOTES_URL.to_string(), None)
    }

    /// Create a backend with a custom endpoint and optional bearer token.
    pub fn with_config(base_url: String, token: Option<String>) -> Self {
        let timeout_secs = std::env::var(ENV_NOTES_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(NOTES_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let feed_client = Client::builder()
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            base_url = %base_url,
            timeout_secs,
            authenticated = token.is_some(),
            "Initializing note backend"
        );

        Self {
            client,
            feed_client,
            base_url,
            token,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(ENV_NOTES_BASE_URL).unwrap_or_else(|_| DEFAULT_NOTES_URL.to_string());
        let token = std::env::var(ENV_NOTES_TOKEN)
            .ok()
            .filter(|t| !t.is_empty());
        Self::with_config(base_url, token)
    }

    /// Apply the bearer token when one is configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl Default for HttpNoteBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteBackend for HttpNoteBackend {
    #[instrument(skip(self), fields(subsystem = "store", component = "http_backend", op = "list"))]
    async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self
            .authorize(self.client.get(format!("{}/notes", self.base_url)))
            .query(&[("order", "created_at.desc")])
            .send()
            .await
            .map_err(|e| Error::Request(format!("Note backend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Persistence(format!(
                "Note backend returned {}: {}",
                status, body
            )));
        }

        let notes: Vec<Note> = response
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("Malformed note backend response: {}", e)))?;

        debug!(note_count = notes.len(), "Fetched note list");
        Ok(notes)
    }

    #[instrument(skip(self, note), fields(subsystem = "store", component = "http_backend", op = "insert"))]
    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        let response = self
            .authorize(self.client.post(format!("{}/notes", self.base_url)))
            .json(&note)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Note backend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Persistence(format!(
                "Note backend returned {}: {}",
                status, body
            )));
        }

        let created: Note = response
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("Malformed note backend response: {}", e)))?;

        debug!(note_id = %created.id, "Inserted note");
        Ok(created)
    }

    #[instrument(skip(self), fields(subsystem = "store", component = "http_backend", op = "delete", note_id = %id))]
    async fn delete_note(&self, id: Uuid) -> Result<()> {
        let response = self
            .authorize(self.client.delete(format!("{}/notes/{}", self.base_url, id)))
            .send()
            .await
            .map_err(|e| Error::Request(format!("Note backend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Persistence(format!(
                "Note backend returned {}: {}",
                status, body
            )));
        }

        debug!("Deleted note");
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for HttpNoteBackend {
    #[instrument(skip(self), fields(subsystem = "store", component = "http_backend", op = "subscribe"))]
    async fn subscribe(&self) -> Result<BoxStream<'static, Result<ChangeEvent>>> {
        let response = self
            .authorize(self.feed_client.get(format!("{}/notes/feed", self.base_url)))
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Feed subscription failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Channel(format!(
                "Feed subscription returned {}",
                status
            )));
        }

        info!("Subscribed to note change feed");
        Ok(parse_feed_stream(response.bytes_stream()))
    }
}

/// Parse an SSE-style byte stream into individual change events.
pub fn parse_feed_stream(
    stream: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> BoxStream<'static, Result<ChangeEvent>> {
    let events = stream
        .map(|chunk_result| {
            chunk_result.map_err(|e| Error::Channel(format!("Feed stream error: {}", e)))
        })
        .flat_map(|result| {
            futures::stream::iter(match result {
                Ok(bytes) => parse_feed_chunk(&String::from_utf8_lossy(&bytes)),
                Err(e) => vec![Err(e)],
            })
        });

    Box::pin(events)
}

/// Parse a single feed chunk into zero or more change events.
fn parse_feed_chunk(chunk: &str) -> Vec<Result<ChangeEvent>> {
    let mut events = Vec::new();

    for line in chunk.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        // Parse data lines
        if let Some(data) = line.strip_prefix("data: ") {
            match serde_json::from_str::<ChangeEvent>(data) {
                Ok(event) => events.push(Ok(event)),
                Err(e) => {
                    events.push(Err(Error::Channel(format!(
                        "Malformed change event: {}",
                        e
                    ))));
                }
            }
        }
    }

    events
}
