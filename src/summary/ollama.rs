//! Ollama `/api/chat` adapter.

use super::{SummaryClient, SummaryError};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary client backed by a local Ollama runtime.
///
/// Each attempt is bounded by `timeout`. Connect failures and timeouts are retried up to
/// `max_retries` times with linear backoff; error statuses and malformed bodies are returned
/// immediately.
pub struct OllamaSummaryClient {
    http: Client,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_backoff: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

impl OllamaSummaryClient {
    /// Build a client with an explicit per-attempt deadline and no retries.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SummaryError> {
        let http = Client::builder()
            .user_agent("rusty-students/summary")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                SummaryError::Unavailable(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            max_retries: 0,
            retry_backoff: Duration::ZERO,
        })
    }

    /// Build a client from the loaded service configuration.
    pub fn from_config(config: &Config) -> Result<Self, SummaryError> {
        Ok(Self::new(
            config.ollama_url.clone(),
            config.ollama_model.clone(),
            config.summary_timeout,
        )?
        .with_retries(config.summary_max_retries, config.summary_retry_backoff))
    }

    /// Retry transport failures up to `max_retries` extra times, waiting `attempt * backoff`.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> Result<String, SummaryError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            if error.is_timeout() {
                self.transport_error(error)
            } else {
                SummaryError::InvalidResponse(format!(
                    "failed to decode Ollama response: {error}"
                ))
            }
        })?;

        Ok(body.message.content)
    }

    fn transport_error(&self, error: reqwest::Error) -> SummaryError {
        if error.is_timeout() {
            SummaryError::TimedOut(format!("Ollama at {} did not respond: {error}", self.base_url))
        } else {
            SummaryError::Unavailable(format!(
                "failed to reach Ollama at {}: {error}",
                self.base_url
            ))
        }
    }
}

#[async_trait]
impl SummaryClient for OllamaSummaryClient {
    async fn generate(&self, prompt: String) -> Result<String, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            stream: false,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Err(error) if error.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    tracing::warn!(attempt, ?delay, %error, "Retrying summary request");
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}
