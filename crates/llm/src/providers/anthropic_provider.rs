use super::{
    build_http_client, decode_json, empty_content, ensure_success, transport_error,
    BackendResponse, ChatMessage, GenerationParams, HttpTimeouts, LlmBackend, MessageRole,
    TokenUsage,
};
use async_trait::async_trait;
use common::{ProviderError, ProviderErrorKind, ProviderResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info};

pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeouts: &HttpTimeouts,
    ) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::new(
                "anthropic",
                ProviderErrorKind::Authentication,
                "Anthropic API key cannot be empty",
            ));
        }

        let client = build_http_client("anthropic", timeouts)?;
        let endpoint = endpoint
            .unwrap_or_else(|| ANTHROPIC_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            endpoint,
            client,
        })
    }

    /// System messages go into the top-level `system` field; the rest keep their order
    fn split_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<AnthropicMessage>) {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let conversation = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| AnthropicMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        let system = (!system.is_empty()).then(|| system.join("\n"));
        (system, conversation)
    }
}

#[async_trait]
impl LlmBackend for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> ProviderResult<BackendResponse> {
        let start_time = Instant::now();
        let (system, conversation) = Self::split_messages(messages);

        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: params.max_tokens,
            messages: conversation,
            system,
            temperature: params.temperature,
            extra: params.options.clone(),
        };

        info!(
            "🚀 Sending request to Anthropic: {} messages (model: {})",
            messages.len(),
            model
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("anthropic", e))?;

        let response = ensure_success("anthropic", response).await?;
        let body: AnthropicResponse = decode_json("anthropic", response).await?;

        let content = body
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| empty_content("anthropic"))?;

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        debug!(
            "✅ Received response from Anthropic ({:?}): {} tokens",
            start_time.elapsed(),
            usage.total_tokens
        );

        Ok(BackendResponse {
            content,
            usage,
            provider: "anthropic".to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
