use crate::providers::{
    AnthropicProvider, GoogleProvider, HttpTimeouts, LlmBackend, OpenAICompatibleProvider,
};
use crate::registry::{ProviderRegistry, DEFAULT_PROVIDER};
use common::ProviderResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Credentials and optional endpoint override for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

impl ProviderSettings {
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            endpoint: None,
        }
    }

    /// Key present and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub google: ProviderSettings,
    pub zai: ProviderSettings,
    pub default_provider: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::default(),
            anthropic: ProviderSettings::default(),
            google: ProviderSettings::default(),
            zai: ProviderSettings::default(),
            default_provider: DEFAULT_PROVIDER.to_string(),
        }
    }
}

impl ProvidersConfig {
    pub fn configured(&self) -> Vec<&'static str> {
        [
            ("openai", &self.openai),
            ("anthropic", &self.anthropic),
            ("google", &self.google),
            ("zai", &self.zai),
        ]
        .into_iter()
        .filter(|(_, s)| s.api_key().is_some())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Factory for building the provider registry from configuration
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Register a backend for every provider with credentials; the rest stay unconfigured
    pub fn build_registry(
        config: &ProvidersConfig,
        timeouts: &HttpTimeouts,
    ) -> ProviderResult<ProviderRegistry> {
        let mut registry = ProviderRegistry::new()
            .with_default_provider(config.default_provider.clone())
            .with_call_timeout(timeouts.total());

        if let Some(key) = config.openai.api_key() {
            let provider =
                OpenAICompatibleProvider::openai(key, config.openai.endpoint.clone(), timeouts)?;
            registry.register("openai", Arc::new(provider) as Arc<dyn LlmBackend>);
        }

        if let Some(key) = config.anthropic.api_key() {
            let provider =
                AnthropicProvider::new(key, config.anthropic.endpoint.clone(), timeouts)?;
            registry.register("anthropic", Arc::new(provider) as Arc<dyn LlmBackend>);
        }

        if let Some(key) = config.google.api_key() {
            let provider = GoogleProvider::new(key, config.google.endpoint.clone(), timeouts)?;
            registry.register("google", Arc::new(provider) as Arc<dyn LlmBackend>);
        }

        if let Some(key) = config.zai.api_key() {
            let provider =
                OpenAICompatibleProvider::zai(key, config.zai.endpoint.clone(), timeouts)?;
            registry.register("zai", Arc::new(provider) as Arc<dyn LlmBackend>);
        }

        if registry.is_empty() {
            debug!("No provider credentials configured; every call will fail as not configured");
        } else {
            info!("🔌 Configured providers: {:?}", registry.providers());
        }

        Ok(registry)
    }
}
