//! Provider Registry - routes a model id to the backend that serves it

use crate::providers::{BackendResponse, ChatMessage, GenerationParams, LlmBackend};
use async_trait::async_trait;
use common::{ProviderError, ProviderResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Provider used for model ids that match no known prefix
pub const DEFAULT_PROVIDER: &str = "zai";

const PREFIX_ROUTES: &[(&str, &str)] = &[
    ("gpt", "openai"),
    ("claude", "anthropic"),
    ("gemini", "google"),
];

/// Explicit provider registry: provider name -> backend, constructed once and shared
pub struct ProviderRegistry {
    backends: HashMap<String, Arc<dyn LlmBackend>>,
    default_provider: String,
    call_timeout: Option<Duration>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .field("default_provider", &self.default_provider)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            default_provider: DEFAULT_PROVIDER.to_string(),
            call_timeout: None,
        }
    }

    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    /// Upper bound on every routed call, on top of the HTTP client timeouts
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_backend(mut self, provider: impl Into<String>, backend: Arc<dyn LlmBackend>) -> Self {
        self.register(provider, backend);
        self
    }

    pub fn register(&mut self, provider: impl Into<String>, backend: Arc<dyn LlmBackend>) {
        let provider = provider.into();
        debug!("Registering backend for provider '{}'", provider);
        self.backends.insert(provider, backend);
    }

    /// Provider name for a model id, by fixed prefix convention
    pub fn provider_for_model(&self, model: &str) -> &str {
        let lower = model.to_lowercase();
        PREFIX_ROUTES
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix))
            .map(|(_, provider)| *provider)
            .unwrap_or(self.default_provider.as_str())
    }

    pub fn resolve(&self, model: &str) -> ProviderResult<Arc<dyn LlmBackend>> {
        let provider = self.provider_for_model(model);
        self.backends
            .get(provider)
            .cloned()
            .ok_or_else(|| ProviderError::not_configured(provider, model))
    }

    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[async_trait]
impl LlmBackend for ProviderRegistry {
    fn provider_name(&self) -> &str {
        "registry"
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> ProviderResult<BackendResponse> {
        let backend = self.resolve(model)?;
        let provider = backend.provider_name().to_string();

        let call = backend.generate(messages, model, params);
        let result = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::timeout(
                    &provider,
                    format!("call to '{}' exceeded {:?}", model, limit),
                )),
            },
            None => call.await,
        };

        if let Err(e) = &result {
            warn!("Backend call failed for model '{}': {}", model, e);
        }
        result
    }
}
