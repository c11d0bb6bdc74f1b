use anyhow::{Context, Result};
use empathy::{EmotionAnalyzer, OverlaySettings};
use infrastructure::config::{ConfigLoader, ConfigSource, ForgeConfig};
use llm::{LlmBackend, LlmProviderFactory};
use router::ModelSelector;
use std::path::Path;
use std::sync::Arc;

/// Loaded configuration plus the backend every command talks through
pub struct AppContext {
    pub config: ForgeConfig,
    pub source: ConfigSource,
    backend: Arc<dyn LlmBackend>,
}

impl AppContext {
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = config_path {
            loader = loader.with_path(path);
        }

        let (config, source) = loader.load_with_source().await?;
        let registry = LlmProviderFactory::build_registry(&config.providers, &config.timeouts)
            .context("Failed to build provider registry")?;

        Ok(Self {
            config,
            source,
            backend: Arc::new(registry),
        })
    }

    pub fn with_backend(config: ForgeConfig, backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            config,
            source: ConfigSource::Default,
            backend,
        }
    }

    pub fn backend(&self) -> Arc<dyn LlmBackend> {
        self.backend.clone()
    }

    pub fn selector(&self, seed: Option<u64>) -> ModelSelector {
        let selector = ModelSelector::new(self.backend.clone())
            .with_catalog(self.config.catalog())
            .with_load_balance_mode(self.config.routing.load_balance_mode);

        match seed {
            Some(seed) => selector.with_seed(seed),
            None => selector,
        }
    }

    /// Keyword analyzer, with the model overlay when configured or forced
    pub fn emotion_analyzer(&self, force_overlay: bool) -> EmotionAnalyzer {
        let settings = self.config.overlay_settings().or_else(|| {
            force_overlay.then(|| OverlaySettings {
                model: self.config.emotion.overlay_model.clone(),
                temperature: self.config.emotion.overlay_temperature,
                ..OverlaySettings::default()
            })
        });

        match settings {
            Some(settings) => EmotionAnalyzer::with_overlay(self.backend.clone(), settings),
            None => EmotionAnalyzer::new(),
        }
    }
}
