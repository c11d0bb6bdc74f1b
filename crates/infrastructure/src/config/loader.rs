use super::settings::ForgeConfig;
use super::validator::ConfigValidator;
use anyhow::{Context, Result};
use common::ConfigError;
use router::{LoadBalanceMode, RoutingStrategy};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Default,
}

/// Scalar overrides read from `FORGE_*` variables
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    primary_model: Option<String>,
    secondary_models: Option<Vec<String>>,
    strategy: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    load_balance_mode: Option<String>,
    default_provider: Option<String>,
    connect_timeout_secs: Option<u64>,
    total_timeout_secs: Option<u64>,
    overlay_enabled: Option<bool>,
    overlay_model: Option<String>,
    log_level: Option<String>,
    log_json: Option<bool>,
}

/// Layered loading: defaults, then a config file, then `.env` and the environment
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    config_paths: Vec<PathBuf>,
    env_prefix: String,
    load_dotenv: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            config_paths: Self::default_config_paths(),
            env_prefix: "FORGE_".to_string(),
            load_dotenv: true,
        }
    }

    /// Load exactly this file; a missing or malformed file is an error
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Replace the discovery list
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config_paths = paths;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("forge.toml"), PathBuf::from(".forgerc.toml")];

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config").join("forge").join("config.toml"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("forge").join("config.toml"));
        }

        paths
    }

    pub async fn load(&self) -> Result<ForgeConfig> {
        let (config, _) = self.load_with_source().await?;
        Ok(config)
    }

    pub async fn load_with_source(&self) -> Result<(ForgeConfig, ConfigSource)> {
        let (mut config, source) = self.load_base_config().await?;

        if self.load_dotenv {
            match dotenv::dotenv() {
                Ok(path) => debug!("Loaded environment from {}", path.display()),
                Err(e) => debug!("No .env file loaded: {}", e),
            }
        }

        self.apply_env_overrides(&mut config)?;
        ConfigValidator::new()
            .validate(&config)
            .context("Configuration failed validation")?;

        Ok((config, source))
    }

    async fn load_base_config(&self) -> Result<(ForgeConfig, ConfigSource)> {
        if let Some(path) = &self.explicit_path {
            let config = self
                .load_file(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            return Ok((config, ConfigSource::File(path.clone())));
        }

        for path in &self.config_paths {
            if !path.exists() {
                continue;
            }
            match self.load_file(path).await {
                Ok(config) => {
                    info!("Loaded configuration from: {}", path.display());
                    return Ok((config, ConfigSource::File(path.clone())));
                }
                Err(e) => {
                    warn!("Failed to load config from {}: {:#}", path.display(), e);
                }
            }
        }

        debug!("No config file found, using defaults");
        Ok((ForgeConfig::default(), ConfigSource::Default))
    }

    async fn load_file(&self, path: &Path) -> Result<ForgeConfig> {
        let content = fs::read_to_string(path)
            .await
            .map_err(ConfigError::Io)
            .context("Failed to read config file")?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let parsed = match extension {
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
        };

        Ok(parsed?)
    }

    fn apply_env_overrides(&self, config: &mut ForgeConfig) -> Result<()> {
        let providers = [
            ("OPENAI_API_KEY", &mut config.providers.openai),
            ("ANTHROPIC_API_KEY", &mut config.providers.anthropic),
            ("GOOGLE_API_KEY", &mut config.providers.google),
            ("ZAI_API_KEY", &mut config.providers.zai),
        ];
        for (var, settings) in providers {
            if let Ok(key) = env::var(var) {
                if !key.trim().is_empty() {
                    debug!("Using {} from environment", var);
                    settings.api_key = Some(key);
                }
            }
        }

        let overrides: EnvOverrides = envy::prefixed(self.env_prefix.as_str())
            .from_env()
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to read environment overrides")?;

        let routing = &mut config.routing;
        if let Some(model) = overrides.primary_model {
            routing.primary_model = model;
        }
        if let Some(models) = overrides.secondary_models {
            routing.secondary_models = models.into_iter().filter(|m| !m.trim().is_empty()).collect();
        }
        if let Some(strategy) = overrides.strategy {
            routing.strategy = strategy
                .parse::<RoutingStrategy>()
                .map_err(|reason| ConfigError::invalid("strategy", reason))?;
        }
        if let Some(temperature) = overrides.temperature {
            routing.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            routing.max_tokens = max_tokens;
        }
        if let Some(mode) = overrides.load_balance_mode {
            routing.load_balance_mode = parse_load_balance_mode(&mode)?;
        }

        if let Some(provider) = overrides.default_provider {
            config.providers.default_provider = provider;
        }
        if let Some(secs) = overrides.connect_timeout_secs {
            config.timeouts.connect_secs = secs;
        }
        if let Some(secs) = overrides.total_timeout_secs {
            config.timeouts.total_secs = secs;
        }

        if let Some(enabled) = overrides.overlay_enabled {
            config.emotion.overlay_enabled = enabled;
        }
        if let Some(model) = overrides.overlay_model {
            config.emotion.overlay_model = model;
        }

        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }
        if let Some(json) = overrides.log_json {
            config.logging.json_output = json;
        }

        Ok(())
    }

    pub async fn save_config(&self, config: &ForgeConfig, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("toml");

        let content = match extension {
            "json" => serde_json::to_string_pretty(config)?,
            _ => toml::to_string_pretty(config)?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, content).await?;
        info!("Configuration saved to: {}", path.display());

        Ok(())
    }

    pub fn generate_example_config() -> String {
        let mut config = ForgeConfig::default();
        config.providers.openai.api_key = Some("your-openai-key".to_string());
        config.providers.anthropic.api_key = Some("your-anthropic-key".to_string());
        config.routing.secondary_models = vec!["claude-opus-4".to_string(), "gemini-flash-2.5".to_string()];

        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| "Failed to generate example config".to_string())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_load_balance_mode(value: &str) -> Result<LoadBalanceMode, ConfigError> {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "sequential" => Ok(LoadBalanceMode::Sequential),
        "wall_clock" | "wallclock" => Ok(LoadBalanceMode::WallClock),
        other => Err(ConfigError::invalid(
            "load_balance_mode",
            format!("unknown mode '{}'", other),
        )),
    }
}
