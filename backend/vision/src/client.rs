//! Anthropic messages-API vision client with ordered model fallback.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use meterwatch_core::{MeterError, VisionReader};

use crate::parse::{parse_reply, ReplyParse};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

/// Per-attempt request timeout. There is no whole-loop timeout; resilience
/// is bounded by `candidates.len() * REQUEST_TIMEOUT`.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a single model attempt, driving the candidate loop:
/// `Numeric` and `FatalAuth` stop the iteration, everything else advances
/// to the next candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Numeric(f64),
    Unreadable,
    Transient(String),
    FatalAuth(u16),
}

/// Vision client posting meter images to the Anthropic messages API,
/// trying each configured model candidate in priority order.
pub struct AnthropicVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    candidates: Vec<String>,
    unreadable_marker: String,
}

impl AnthropicVisionClient {
    pub fn new(
        api_key: impl Into<String>,
        candidates: Vec<String>,
        unreadable_marker: impl Into<String>,
    ) -> Result<Self, MeterError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeterError::ConfigError(format!("vision client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            candidates,
            unreadable_marker: unreadable_marker.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// One attempt against one model. Never returns an error: every failure
    /// mode is folded into an [`AttemptOutcome`] so the caller's loop policy
    /// stays in one place.
    async fn attempt(&self, model: &str, image_b64: &str, prompt: &str) -> AttemptOutcome {
        let body = MessagesRequest {
            model,
            max_tokens: MAX_TOKENS,
            messages: vec![UserMessage {
                role: "user",
                content: vec![
                    ContentBlock::Text { text: prompt },
                    ContentBlock::Image {
                        source: Base64Source {
                            source_type: "base64",
                            media_type: "image/jpeg",
                            data: image_b64,
                        },
                    },
                ],
            }],
        };

        let response = match self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // Timeouts and transport errors land here.
                warn!(model, error = %e, "Vision request failed");
                return AttemptOutcome::Transient(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(model, status = status.as_u16(), body = %error_body, "Vision API error");
            return match status.as_u16() {
                // Retrying other models cannot fix a bad credential.
                401 | 403 => AttemptOutcome::FatalAuth(status.as_u16()),
                // 429/5xx, and any status outside the fatal set, are worth
                // a try with the next candidate.
                code => AttemptOutcome::Transient(format!("HTTP {code}")),
            };
        }

        let reply: MessagesResponse = match response.json().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(model, error = %e, "Vision response was not valid JSON");
                return AttemptOutcome::Transient(e.to_string());
            }
        };

        let text = reply
            .content
            .first()
            .map(|block| block.text.trim())
            .unwrap_or_default();

        match parse_reply(text, &self.unreadable_marker) {
            ReplyParse::Numeric(value) => AttemptOutcome::Numeric(value),
            ReplyParse::Unreadable => {
                warn!(model, "Model reported the meter as unreadable");
                AttemptOutcome::Unreadable
            }
            ReplyParse::Invalid => {
                warn!(model, reply = %text, "Model reply is not a number");
                AttemptOutcome::Transient(format!("unparseable reply: '{text}'"))
            }
        }
    }
}

#[async_trait]
impl VisionReader for AnthropicVisionClient {
    async fn read_value(&self, image: &[u8], prompt: &str) -> Result<f64, MeterError> {
        let image_b64 = STANDARD.encode(image);
        let total = self.candidates.len();

        for (i, model) in self.candidates.iter().enumerate() {
            debug!(model, attempt = i + 1, total, "Trying vision model");
            match self.attempt(model, &image_b64, prompt).await {
                AttemptOutcome::Numeric(value) => {
                    info!(model, value, "Read meter value");
                    return Ok(value);
                }
                AttemptOutcome::Unreadable | AttemptOutcome::Transient(_) => continue,
                AttemptOutcome::FatalAuth(status) => {
                    error!(status, "Authentication error - aborting model fallback");
                    return Err(MeterError::AuthenticationError { status });
                }
            }
        }

        error!("All model candidates failed to produce a reading");
        Err(MeterError::AllModelsExhausted)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<UserMessage<'a>>,
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text { text: &'a str },
    Image { source: Base64Source<'a> },
}

#[derive(Serialize)]
struct Base64Source<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: String,
}
