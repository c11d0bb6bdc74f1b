use common::LoggingConfig;
use empathy::OverlaySettings;
use llm::{HttpTimeouts, ProvidersConfig};
use router::catalog::DEFAULT_COST_PER_1K;
use router::{CapabilityTag, LoadBalanceMode, ModelCatalog, ModelProfile, RoutingConfig, RoutingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration, one table per concern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgeConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub timeouts: HttpTimeouts,

    #[serde(default)]
    pub routing: RoutingDefaults,

    #[serde(default)]
    pub emotion: EmotionSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Replaces the built-in catalog when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelProfileConfig>,
}

/// Routing settings used when a request does not carry its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingDefaults {
    pub primary_model: String,
    pub secondary_models: Vec<String>,
    pub strategy: RoutingStrategy,
    pub model_weights: HashMap<String, f64>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub load_balance_mode: LoadBalanceMode,
}

impl Default for RoutingDefaults {
    fn default() -> Self {
        Self {
            primary_model: "gpt-4o".to_string(),
            secondary_models: Vec::new(),
            strategy: RoutingStrategy::Auto,
            model_weights: HashMap::new(),
            temperature: 0.7,
            max_tokens: 2000,
            load_balance_mode: LoadBalanceMode::Sequential,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionSettings {
    /// Ask a model for a second opinion on top of the keyword lexicon
    pub overlay_enabled: bool,
    pub overlay_model: String,
    pub overlay_temperature: f32,
}

impl Default for EmotionSettings {
    fn default() -> Self {
        Self {
            overlay_enabled: false,
            overlay_model: "gpt-4o".to_string(),
            overlay_temperature: 0.3,
        }
    }
}

/// Catalog entry as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfileConfig {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_model_provider")]
    pub provider: String,
    #[serde(default)]
    pub tags: Vec<CapabilityTag>,
    #[serde(default)]
    pub max_tokens: u64,
    #[serde(default = "default_cost_per_1k")]
    pub cost_per_1k: f64,
}

fn default_model_provider() -> String {
    "custom".to_string()
}

fn default_cost_per_1k() -> f64 {
    DEFAULT_COST_PER_1K
}

impl ModelProfileConfig {
    pub fn to_profile(&self) -> ModelProfile {
        let display_name = self.display_name.as_deref().unwrap_or(&self.id);
        ModelProfile::new(&self.id, display_name, &self.provider, &self.tags)
            .with_limits(self.max_tokens, self.cost_per_1k)
    }
}

impl ForgeConfig {
    pub fn routing_config(&self) -> RoutingConfig {
        let routing = &self.routing;
        RoutingConfig {
            primary_model: routing.primary_model.clone(),
            secondary_models: routing.secondary_models.clone(),
            strategy: routing.strategy,
            model_weights: routing.model_weights.clone(),
            temperature: routing.temperature,
            max_tokens: routing.max_tokens,
        }
    }

    pub fn catalog(&self) -> ModelCatalog {
        if self.models.is_empty() {
            ModelCatalog::builtin()
        } else {
            ModelCatalog::from_profiles(self.models.iter().map(ModelProfileConfig::to_profile).collect())
        }
    }

    /// `None` unless the model overlay is switched on
    pub fn overlay_settings(&self) -> Option<OverlaySettings> {
        self.emotion.overlay_enabled.then(|| OverlaySettings {
            model: self.emotion.overlay_model.clone(),
            temperature: self.emotion.overlay_temperature,
            ..OverlaySettings::default()
        })
    }
}
