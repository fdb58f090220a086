//! HTTP chat-completion classifier backend.
//!
//! Single-turn text-in / verdict-out call against an Ollama-compatible
//! `/api/chat` endpoint. The system instruction demands a one-word
//! `HARMFUL` / `SAFE` answer; anything else is a malformed reply and
//! surfaces as an error for the caller to fail closed on.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use loci_core::defaults::{
    ENV_CLASSIFIER_BASE_URL, ENV_CLASSIFIER_MODEL, ENV_CLASSIFIER_TIMEOUT_SECS,
};
use loci_core::{ClassifierBackend, ClassifierVerdict, Error, Result};

/// Default classifier endpoint.
pub const DEFAULT_CLASSIFIER_URL: &str = loci_core::defaults::CLASSIFIER_URL;

/// Default classifier model.
pub const DEFAULT_CLASSIFIER_MODEL: &str = loci_core::defaults::CLASSIFIER_MODEL;

/// Timeout for classifier requests (seconds).
pub const CLASSIFIER_TIMEOUT_SECS: u64 = loci_core::defaults::CLASSIFIER_TIMEOUT_SECS;

/// Instruction pinning the model to a one-word verdict.
const SYSTEM_INSTRUCTION: &str = "You are a strict content safety classifier for short \
    location notes. Classify the user's message. Answer with exactly one word: \
    HARMFUL if it contains hate speech, harassment, threats, sexual content, or \
    incitement to violence; otherwise SAFE.";

/// Chat-completion classifier backend.
pub struct ChatClassifier {
    client: Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl ChatClassifier {
    /// Create a classifier with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_CLASSIFIER_URL.to_string(),
            DEFAULT_CLASSIFIER_MODEL.to_string(),
        )
    }

    /// Create a classifier with custom endpoint and model.
    pub fn with_config(base_url: String, model: String) -> Self {
        let timeout_secs = std::env::var(ENV_CLASSIFIER_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(CLASSIFIER_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            base_url = %base_url,
            model = %model,
            timeout_secs,
            "Initializing chat classifier"
        );

        Self {
            client,
            base_url,
            model,
            timeout_secs,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_CLASSIFIER_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_CLASSIFIER_URL.to_string());
        let model = std::env::var(ENV_CLASSIFIER_MODEL)
            .unwrap_or_else(|_| DEFAULT_CLASSIFIER_MODEL.to_string());
        Self::with_config(base_url, model)
    }
}

impl Default for ChatClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Chat API message for `/api/chat`.
#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request payload for the `/api/chat` endpoint.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Response from the `/api/chat` endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Extract the one-word verdict from a chat reply.
///
/// Matched case-insensitively anywhere in the reply; `HARMFUL` wins when
/// both words appear. A reply containing neither is malformed.
fn parse_verdict(content: &str) -> Result<ClassifierVerdict> {
    let upper = content.to_uppercase();
    if upper.contains("HARMFUL") {
        Ok(ClassifierVerdict::Harmful)
    } else if upper.contains("SAFE") {
        Ok(ClassifierVerdict::Safe)
    } else {
        Err(Error::Classification(format!(
            "Malformed classifier reply: {:?}",
            content
        )))
    }
}

#[async_trait]
impl ClassifierBackend for ChatClassifier {
    #[instrument(skip(self, text), fields(subsystem = "moderation", component = "classifier", op = "classify", model = %self.model))]
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict> {
        let start = Instant::now();

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Classifier request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Classifier returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            Error::Request(format!("Failed to parse classifier response: {}", e))
        })?;

        let verdict = parse_verdict(&result.message.content)?;
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            verdict = ?verdict,
            duration_ms = elapsed,
            "Classification complete"
        );
        if elapsed > 10_000 {
            warn!(
                duration_ms = elapsed,
                text_len = text.len(),
                slow = true,
                "Slow classification"
            );
        }
        Ok(verdict)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
