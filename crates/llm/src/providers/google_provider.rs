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

pub const GOOGLE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` backend
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl GoogleProvider {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeouts: &HttpTimeouts,
    ) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::new(
                "google",
                ProviderErrorKind::Authentication,
                "Google API key cannot be empty",
            ));
        }

        let client = build_http_client("google", timeouts)?;
        let endpoint = endpoint
            .unwrap_or_else(|| GOOGLE_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            endpoint,
            client,
        })
    }

    fn get_api_endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    fn build_request(messages: &[ChatMessage], params: &GenerationParams) -> GoogleRequest {
        let system: Vec<GooglePart> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| GooglePart {
                text: m.content.clone(),
            })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| GoogleContent {
                role: match m.role {
                    MessageRole::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                },
                parts: vec![GooglePart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GoogleRequest {
            contents,
            system_instruction: (!system.is_empty()).then_some(GoogleSystemInstruction { parts: system }),
            generation_config: GoogleGenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
                extra: params.options.clone(),
            },
        }
    }
}

#[async_trait]
impl LlmBackend for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> ProviderResult<BackendResponse> {
        let start_time = Instant::now();
        let request = Self::build_request(messages, params);

        info!(
            "🚀 Sending request to Google AI: {} messages (model: {})",
            messages.len(),
            model
        );

        let response = self
            .client
            .post(self.get_api_endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("google", e))?;

        let response = ensure_success("google", response).await?;
        let body: GoogleResponse = decode_json("google", response).await?;

        let content = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| empty_content("google"))?;

        let usage = body
            .usage_metadata
            .map(|u| {
                TokenUsage::from_parts(
                    u.prompt_token_count,
                    u.candidates_token_count,
                    u.total_token_count,
                )
            })
            .unwrap_or_default();

        debug!(
            "✅ Received response from Google AI ({:?}): {} tokens",
            start_time.elapsed(),
            usage.total_tokens
        );

        Ok(BackendResponse {
            content,
            usage,
            provider: "google".to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest {
    contents: Vec<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GoogleSystemInstruction>,
    generation_config: GoogleGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GoogleContent {
    role: String,
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GooglePart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GoogleSystemInstruction {
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    usage_metadata: Option<GoogleUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_roles_are_mapped() {
        let messages = vec![
            ChatMessage::system("Be kind."),
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello"),
        ];
        let request = GoogleProvider::build_request(&messages, &GenerationParams::new(0.3, 64));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be kind.");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 64);
    }

    #[tokio::test]
    async fn test_google_mock_response() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/models/gemini-flash-2.5:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-api-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Bonjour"}]}
                }],
                "usageMetadata": {
                    "promptTokenCount": 4,
                    "candidatesTokenCount": 2,
                    "totalTokenCount": 6
                }
            }"#,
            )
            .create_async()
            .await;

        let provider =
            GoogleProvider::new("test-api-key", Some(server.url()), &HttpTimeouts::default())
                .unwrap();

        let response = provider
            .generate(
                &[ChatMessage::user("Hello in French")],
                "gemini-flash-2.5",
                &GenerationParams::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.content, "Bonjour");
        assert_eq!(response.usage.total_tokens, 6);
        assert_eq!(response.usage.completion_tokens, Some(2));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_google_no_candidates() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("POST", "/models/gemini-flash-2.5:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let provider =
            GoogleProvider::new("key", Some(server.url()), &HttpTimeouts::default()).unwrap();

        let err = provider
            .generate(
                &[ChatMessage::user("Hello")],
                "gemini-flash-2.5",
                &GenerationParams::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::InvalidResponse);
    }
}
