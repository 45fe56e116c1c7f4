//! Generation providers.
//!
//! Two backends implement the core [`Generator`] trait:
//! - **[`GoogleGenerator`]** — the Google Generative Language
//!   `generateContent` endpoint (`gemini-2.0-flash` by default).
//! - **[`OllamaGenerator`]** — a local Ollama instance's `/api/chat`
//!   endpoint, non-streaming.
//!
//! Assistant turns map to the `"model"` role on the Google wire format;
//! system instructions travel out-of-band in `systemInstruction` rather
//! than as a conversation turn.

use std::time::Duration;

use async_trait::async_trait;

use resume_chat_core::error::RagError;
use resume_chat_core::generation::Generator;
use resume_chat_core::models::{ChatRole, ChatTurn};

use crate::config::GenerationConfig;
use crate::http::{post_json_with_retry, GOOGLE_API_BASE, GOOGLE_API_KEY_VAR};

/// Create the generator selected by `config.provider`.
pub fn create_generator(config: &GenerationConfig) -> anyhow::Result<Box<dyn Generator>> {
    match config.provider.as_str() {
        "google" => Ok(Box::new(GoogleGenerator::new(config)?)),
        "ollama" => Ok(Box::new(OllamaGenerator::new(config)?)),
        other => anyhow::bail!("Unknown generation provider: {}", other),
    }
}

// ============ Google provider ============

/// Generator backed by the Google Generative Language API.
///
/// Requires the `GOOGLE_API_KEY` environment variable.
pub struct GoogleGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl GoogleGenerator {
    pub fn new(config: &GenerationConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(GOOGLE_API_KEY_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", GOOGLE_API_KEY_VAR))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Generator for GoogleGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system: &str,
        conversation: &[ChatTurn],
    ) -> Result<String, RagError> {
        let url = format!(
            "{GOOGLE_API_BASE}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let contents: Vec<serde_json::Value> = conversation
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": turn.content }],
                })
            })
            .collect();
        let body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": contents,
            "generationConfig": { "temperature": self.temperature },
        });

        let json = post_json_with_retry(&self.client, &url, &[], &body, self.max_retries)
            .await
            .map_err(RagError::Generation)?;
        parse_google_candidate(&json)
    }
}

/// Extract the first candidate's concatenated text parts.
fn parse_google_candidate(json: &serde_json::Value) -> Result<String, RagError> {
    let text = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(RagError::Generation(
            "response contained no candidate text".to_string(),
        ));
    }
    Ok(text)
}

// ============ Ollama provider ============

/// Generator backed by a local Ollama instance (`POST /api/chat`).
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> anyhow::Result<Self> {
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system: &str,
        conversation: &[ChatTurn],
    ) -> Result<String, RagError> {
        let mut messages = vec![serde_json::json!({ "role": "system", "content": system })];
        for turn in conversation {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(serde_json::json!({ "role": role, "content": turn.content }));
        }
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": { "temperature": self.temperature },
        });

        let url = format!("{}/api/chat", self.url);
        let json = post_json_with_retry(&self.client, &url, &[], &body, self.max_retries)
            .await
            .map_err(|e| RagError::Generation(format!("Ollama at {}: {}", self.url, e)))?;

        let text = json
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string();
        if text.is_empty() {
            return Err(RagError::Generation(
                "response contained no message content".to_string(),
            ));
        }
        Ok(text)
    }
}
