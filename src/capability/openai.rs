//! OpenAI-backed capability.
//!
//! Retrieval happens locally; the top documents are sent as context to the chat completions
//! endpoint and the model's reply becomes the single answer candidate.

use super::retriever::retrieve;
use super::{AnswerCandidate, CapabilityError, QaCapability};
use crate::corpus::Document;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const MAX_CONTEXT_CHARS_PER_DOCUMENT: usize = 6_000;
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Upper bound on one chat-completions round trip when no request timeout is configured.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You answer questions about the supplied documents. \
Use only the context below. Reply with the answer alone, without preamble.";

/// Chat-completions client grounded on locally retrieved documents.
pub struct OpenAiCapability {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCapability {
    /// Build a client for `base_url` (for example `https://api.openai.com/v1`) that gives up
    /// after [`DEFAULT_HTTP_TIMEOUT`].
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, api_key, model, DEFAULT_HTTP_TIMEOUT)
    }

    /// Build a client whose calls fail once `timeout` elapses.
    pub fn with_timeout(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent("pdfqa/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl QaCapability for OpenAiCapability {
    async fn query(
        &self,
        corpus: &[Document],
        query: &str,
        top_k_retrieve: usize,
        top_k_read: usize,
    ) -> Result<Vec<AnswerCandidate>, CapabilityError> {
        let hits = retrieve(corpus, query, top_k_retrieve);
        if hits.is_empty() || top_k_read == 0 {
            return Ok(Vec::new());
        }

        let context = hits
            .iter()
            .map(|hit| {
                let excerpt: String = hit
                    .document
                    .content
                    .chars()
                    .take(MAX_CONTEXT_CHARS_PER_DOCUMENT)
                    .collect();
                format!("[{}]\n{}", hit.document.source.display(), excerpt)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let payload = json!({
            "model": self.model,
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": format!("{SYSTEM_PROMPT}\n\nContext:\n{context}") },
                { "role": "user", "content": query },
            ],
        });

        tracing::debug!(
            model = %self.model,
            documents = hits.len(),
            "Requesting chat completion"
        );
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CapabilityError::Unavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "Chat completion request failed");
            return Err(CapabilityError::Unavailable(format!(
                "provider returned {status}: {}",
                clip(&body)
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            CapabilityError::InvalidResponse(format!("failed to decode completion: {error}"))
        })?;

        let answer = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if answer.is_empty() {
            return Ok(Vec::new());
        }
        let source = hits.first().map(|hit| hit.document.source.clone());
        Ok(vec![AnswerCandidate {
            text: answer,
            score: 1.0,
            source,
        }])
    }
}

/// Shorten an upstream error body before it reaches a client-facing message.
fn clip(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
