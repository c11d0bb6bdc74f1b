use common::ProviderErrorKind;
use llm::{
    ChatMessage, GenerationParams, HttpTimeouts, LlmBackend, LlmProviderFactory, ProviderSettings,
    ProvidersConfig,
};
use mockito::Server;

fn create_mock_openai_response(content: &str) -> String {
    format!(
        r#"{{
        "choices": [{{
            "message": {{
                "role": "assistant",
                "content": "{}"
            }}
        }}],
        "usage": {{"prompt_tokens": 3, "completion_tokens": 2}}
    }}"#,
        content
    )
}

fn create_mock_anthropic_response(content: &str) -> String {
    format!(
        r#"{{
        "content": [{{"type": "text", "text": "{}"}}],
        "usage": {{"input_tokens": 5, "output_tokens": 4}}
    }}"#,
        content
    )
}

#[tokio::test]
async fn test_registry_routes_by_prefix_to_http_backends() {
    let mut openai = Server::new_async().await;
    let mut anthropic = Server::new_async().await;
    let mut zai = Server::new_async().await;

    let openai_mock = openai
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(create_mock_openai_response("openai says hi"))
        .create_async()
        .await;
    let anthropic_mock = anthropic
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(create_mock_anthropic_response("claude says hi"))
        .create_async()
        .await;
    let zai_mock = zai
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer zai-key")
        .with_status(200)
        .with_body(create_mock_openai_response("zai says hi"))
        .create_async()
        .await;

    let config = ProvidersConfig {
        openai: ProviderSettings {
            api_key: Some("openai-key".to_string()),
            endpoint: Some(openai.url()),
        },
        anthropic: ProviderSettings {
            api_key: Some("anthropic-key".to_string()),
            endpoint: Some(anthropic.url()),
        },
        zai: ProviderSettings {
            api_key: Some("zai-key".to_string()),
            endpoint: Some(zai.url()),
        },
        ..Default::default()
    };

    let registry = LlmProviderFactory::build_registry(&config, &HttpTimeouts::default()).unwrap();
    let messages = [ChatMessage::user("Hello")];
    let params = GenerationParams::default();

    let gpt = registry.generate(&messages, "gpt-4o", &params).await.unwrap();
    assert_eq!(gpt.content, "openai says hi");
    assert_eq!(gpt.provider, "openai");
    assert_eq!(gpt.usage.total_tokens, 5);

    let claude = registry.generate(&messages, "claude-opus-4", &params).await.unwrap();
    assert_eq!(claude.content, "claude says hi");
    assert_eq!(claude.usage.total_tokens, 9);

    let other = registry.generate(&messages, "glm-4.5", &params).await.unwrap();
    assert_eq!(other.content, "zai says hi");
    assert_eq!(other.provider, "zai");

    let err = registry
        .generate(&messages, "gemini-flash-2.5", &params)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::NotConfigured);

    openai_mock.assert_async().await;
    anthropic_mock.assert_async().await;
    zai_mock.assert_async().await;
}
