use super::settings::ForgeConfig;
use common::{ConfigError, ConfigResult};
use std::collections::HashSet;
use tracing::warn;

pub struct ConfigValidator;

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Reports the first violation found
    pub fn validate(&self, config: &ForgeConfig) -> ConfigResult<()> {
        self.validate_routing(config)?;
        self.validate_timeouts(config)?;
        self.validate_emotion(config)?;
        self.validate_models(config)?;
        self.check_providers(config);
        Ok(())
    }

    fn validate_routing(&self, config: &ForgeConfig) -> ConfigResult<()> {
        let routing = &config.routing;

        if !(0.0..=2.0).contains(&routing.temperature) {
            return Err(ConfigError::invalid(
                "routing.temperature",
                format!("must be between 0.0 and 2.0, got {}", routing.temperature),
            ));
        }

        if routing.max_tokens == 0 {
            return Err(ConfigError::invalid("routing.max_tokens", "must be greater than 0"));
        }

        if routing.primary_model.trim().is_empty() {
            return Err(ConfigError::invalid("routing.primary_model", "must not be empty"));
        }

        if let Some((model, weight)) = routing
            .model_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            warn!("Weight {} for {} will be treated as 0", weight, model);
        }

        Ok(())
    }

    fn validate_timeouts(&self, config: &ForgeConfig) -> ConfigResult<()> {
        let timeouts = &config.timeouts;

        if timeouts.connect_secs == 0 {
            return Err(ConfigError::invalid("timeouts.connect_secs", "must be greater than 0"));
        }
        if timeouts.total_secs == 0 {
            return Err(ConfigError::invalid("timeouts.total_secs", "must be greater than 0"));
        }
        if timeouts.connect_secs > timeouts.total_secs {
            return Err(ConfigError::invalid(
                "timeouts.connect_secs",
                format!(
                    "connect timeout {}s exceeds total timeout {}s",
                    timeouts.connect_secs, timeouts.total_secs
                ),
            ));
        }

        Ok(())
    }

    fn validate_emotion(&self, config: &ForgeConfig) -> ConfigResult<()> {
        let emotion = &config.emotion;

        if emotion.overlay_model.trim().is_empty() {
            return Err(ConfigError::invalid("emotion.overlay_model", "must not be empty"));
        }
        if !(0.0..=2.0).contains(&emotion.overlay_temperature) {
            return Err(ConfigError::invalid(
                "emotion.overlay_temperature",
                format!("must be between 0.0 and 2.0, got {}", emotion.overlay_temperature),
            ));
        }

        Ok(())
    }

    fn validate_models(&self, config: &ForgeConfig) -> ConfigResult<()> {
        let mut seen = HashSet::new();

        for model in &config.models {
            if model.id.trim().is_empty() {
                return Err(ConfigError::invalid("models.id", "must not be empty"));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(ConfigError::invalid(
                    "models.id",
                    format!("duplicate catalog entry '{}'", model.id),
                ));
            }
            if !model.cost_per_1k.is_finite() || model.cost_per_1k < 0.0 {
                return Err(ConfigError::invalid(
                    "models.cost_per_1k",
                    format!("'{}' has invalid cost {}", model.id, model.cost_per_1k),
                ));
            }
        }

        Ok(())
    }

    fn check_providers(&self, config: &ForgeConfig) {
        let configured = config.providers.configured();
        if configured.is_empty() {
            warn!("No provider API keys configured; backend calls will fail");
        } else if !configured.contains(&config.providers.default_provider.as_str()) {
            warn!(
                "Default provider '{}' has no API key configured",
                config.providers.default_provider
            );
        }
    }
}
