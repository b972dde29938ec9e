//! Client for any endpoint speaking the OpenAI chat-completions protocol.
//!
//! Covers OpenAI itself as well as self-hosted gateways (vLLM, Ollama,
//! LiteLLM, ...) that expose `POST {base_url}/chat/completions`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    chat::ChatMessage,
    completion::{CompletionProvider, SamplingParams},
    error::EvalError,
};

const ERROR_BODY_LIMIT: usize = 512;

/// Configuration for an OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct OpenAICompatibleConfig {
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token; omitted from the request when absent.
    pub api_key: Option<SecretString>,
    /// Per-request timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct OpenAICompatible {
    config: Arc<OpenAICompatibleConfig>,
    client: Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionMessage {
    content: Option<String>,
}

impl OpenAICompatible {
    /// Creates a client with its own connection pool.
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self, EvalError> {
        let mut builder = Client::builder();
        if let Some(sec) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    /// Creates a client that shares an existing HTTP client.
    pub fn with_client(client: Client, config: OpenAICompatibleConfig) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompatible {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: &SamplingParams,
    ) -> Result<String, EvalError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: sampling.temperature(),
            max_tokens: sampling.max_tokens(),
            stream: false,
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("chat completion payload: {json}");
            }
        }

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let resp = request.send().await?;
        let status = resp.status();
        log::debug!("{} HTTP status: {}", self.config.model, status);

        let raw = resp.text().await?;
        if !status.is_success() {
            return Err(EvalError::Status {
                status: status.as_u16(),
                body: excerpt(&raw),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&raw).map_err(|err| EvalError::ResponseFormat {
                message: format!("failed to decode chat completion: {err}"),
                raw_response: excerpt(&raw),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| EvalError::ResponseFormat {
                message: "response contained no message content".to_string(),
                raw_response: excerpt(&raw),
            })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn excerpt(raw: &str) -> String {
    if raw.chars().count() <= ERROR_BODY_LIMIT {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(ERROR_BODY_LIMIT).collect();
    out.push_str("...");
    out
}
