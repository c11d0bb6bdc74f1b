use super::{
    build_http_client, decode_json, empty_content, ensure_success, transport_error,
    BackendResponse, ChatMessage, GenerationParams, HttpTimeouts, LlmBackend, TokenUsage,
};
use async_trait::async_trait;
use common::{ProviderError, ProviderErrorKind, ProviderResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info};

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const ZAI_ENDPOINT: &str = "https://api.z-ai.com/v1";

/// Any backend speaking the OpenAI chat-completions protocol (OpenAI itself, Z.ai)
#[derive(Debug, Clone)]
pub struct OpenAICompatibleProvider {
    name: String,
    api_key: String,
    endpoint: String,
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeouts: &HttpTimeouts,
    ) -> ProviderResult<Self> {
        let name = name.into();
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::new(
                name,
                ProviderErrorKind::Authentication,
                "API key cannot be empty",
            ));
        }

        let client = build_http_client(&name, timeouts)?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();

        Ok(Self {
            name,
            api_key,
            endpoint,
            client,
        })
    }

    pub fn openai(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeouts: &HttpTimeouts,
    ) -> ProviderResult<Self> {
        let endpoint = endpoint.unwrap_or_else(|| OPENAI_ENDPOINT.to_string());
        Self::new("openai", api_key, endpoint, timeouts)
    }

    pub fn zai(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeouts: &HttpTimeouts,
    ) -> ProviderResult<Self> {
        let endpoint = endpoint.unwrap_or_else(|| ZAI_ENDPOINT.to_string());
        Self::new("zai", api_key, endpoint, timeouts)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmBackend for OpenAICompatibleProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> ProviderResult<BackendResponse> {
        let start_time = Instant::now();

        let request = OpenAIRequest {
            model: model.to_string(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            extra: params.options.clone(),
        };

        info!(
            "🚀 Sending request to {}: {} messages (model: {})",
            self.name,
            messages.len(),
            model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&self.name, e))?;

        let response = ensure_success(&self.name, response).await?;
        let body: OpenAIResponse = decode_json(&self.name, response).await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| empty_content(&self.name))?;

        let usage = body
            .usage
            .map(|u| TokenUsage::from_parts(u.prompt_tokens, u.completion_tokens, u.total_tokens))
            .unwrap_or_default();

        debug!(
            "✅ {} responded in {:?}: {} tokens",
            self.name,
            start_time.elapsed(),
            usage.total_tokens
        );

        Ok(BackendResponse {
            content,
            usage,
            provider: self.name.clone(),
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}
