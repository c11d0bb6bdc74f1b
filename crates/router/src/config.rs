use common::{SelectionError, SelectionResult};
use llm::GenerationParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    #[default]
    Auto,
    Manual,
    LoadBalance,
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingStrategy::Auto => write!(f, "auto"),
            RoutingStrategy::Manual => write!(f, "manual"),
            RoutingStrategy::LoadBalance => write!(f, "load_balance"),
        }
    }
}

impl std::str::FromStr for RoutingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(RoutingStrategy::Auto),
            "manual" => Ok(RoutingStrategy::Manual),
            "load_balance" => Ok(RoutingStrategy::LoadBalance),
            other => Err(format!("unknown routing strategy '{}'", other)),
        }
    }
}

/// Per-request routing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    pub primary_model: String,
    pub secondary_models: Vec<String>,
    pub strategy: RoutingStrategy,
    /// Manual-strategy weights; unset candidates weigh 1.0
    pub model_weights: HashMap<String, f64>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            primary_model: "gpt-4o".to_string(),
            secondary_models: Vec::new(),
            strategy: RoutingStrategy::Auto,
            model_weights: HashMap::new(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

impl RoutingConfig {
    pub fn new(primary_model: impl Into<String>) -> Self {
        Self {
            primary_model: primary_model.into(),
            ..Default::default()
        }
    }

    pub fn with_secondaries<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_weight(mut self, model: impl Into<String>, weight: f64) -> Self {
        self.model_weights.insert(model.into(), weight);
        self
    }

    /// {primary} ∪ secondaries, duplicates removed, primary first
    pub fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(1 + self.secondary_models.len());
        for model in std::iter::once(&self.primary_model).chain(self.secondary_models.iter()) {
            if !out.contains(model) {
                out.push(model.clone());
            }
        }
        out
    }

    /// Secondaries in configured order, deduplicated
    pub fn unique_secondaries(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for model in &self.secondary_models {
            if !out.contains(model) {
                out.push(model.clone());
            }
        }
        out
    }

    pub fn is_candidate(&self, model: &str) -> bool {
        self.primary_model == model || self.secondary_models.iter().any(|m| m == model)
    }

    pub fn validate(&self) -> SelectionResult<()> {
        if self.primary_model.trim().is_empty() && self.secondary_models.is_empty() {
            return Err(SelectionError::NoCandidates);
        }
        if self.candidates().iter().any(|m| m.trim().is_empty()) {
            return Err(SelectionError::EmptyModelId);
        }
        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::new(self.temperature, self.max_tokens)
    }
}
