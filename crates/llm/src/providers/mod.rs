use async_trait::async_trait;
use common::{ProviderError, ProviderErrorKind, ProviderResult};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::error;

pub mod anthropic_provider;
pub mod google_provider;
pub mod openai_provider;

pub use anthropic_provider::AnthropicProvider;
pub use google_provider::GoogleProvider;
pub use openai_provider::OpenAICompatibleProvider;

/// Chat message for conversation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Build from whatever counts a provider reported; the total falls back to the sum
    pub fn from_parts(prompt: Option<u32>, completion: Option<u32>, total: Option<u32>) -> Self {
        let total_tokens =
            total.unwrap_or_else(|| prompt.unwrap_or(0).saturating_add(completion.unwrap_or(0)));
        Self {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens,
        }
    }
}

/// Generated content plus accounting, as returned by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub provider: String,
    pub model: String,
}

/// Sampling parameters for one `generate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Provider-specific extras merged into the request body
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            options: Map::new(),
        }
    }
}

impl GenerationParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Uniform text-generation capability. Implementations perform no retries.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Provider name used in errors and logs
    fn provider_name(&self) -> &str;

    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> ProviderResult<BackendResponse>;
}

/// Connect and total timeouts applied to every backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTimeouts {
    pub connect_secs: u64,
    pub total_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            total_secs: 30,
        }
    }
}

impl HttpTimeouts {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }
}

pub(crate) fn build_http_client(provider: &str, timeouts: &HttpTimeouts) -> ProviderResult<Client> {
    Client::builder()
        .connect_timeout(timeouts.connect())
        .timeout(timeouts.total())
        .build()
        .map_err(|e| {
            ProviderError::new(
                provider,
                ProviderErrorKind::NotConfigured,
                format!("Failed to create HTTP client: {}", e),
            )
        })
}

/// Map a transport-level reqwest failure onto the provider error taxonomy
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    let kind = if err.is_timeout() {
        ProviderErrorKind::Timeout
    } else if err.is_decode() {
        ProviderErrorKind::InvalidResponse
    } else if let Some(status) = err.status() {
        ProviderErrorKind::from_status(status.as_u16())
    } else {
        ProviderErrorKind::Network
    };
    ProviderError::new(provider, kind, err.to_string())
}

/// Reject non-success responses, carrying a truncated body for diagnostics
pub(crate) async fn ensure_success(provider: &str, response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(300).collect();
    error!("{} API error: status {} - {}", provider, status, snippet);

    Err(ProviderError::new(
        provider,
        ProviderErrorKind::from_status(status.as_u16()),
        format!("status {}: {}", status.as_u16(), snippet),
    ))
}

pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    provider: &str,
    response: Response,
) -> ProviderResult<T> {
    response.json::<T>().await.map_err(|e| {
        ProviderError::new(
            provider,
            ProviderErrorKind::InvalidResponse,
            format!("Failed to decode response: {}", e),
        )
    })
}

pub(crate) fn empty_content(provider: &str) -> ProviderError {
    ProviderError::new(
        provider,
        ProviderErrorKind::InvalidResponse,
        format!("Empty response from {}", provider),
    )
}
