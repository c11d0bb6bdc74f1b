//! Static model capability and cost table, doubling as the public model catalog

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost assumed for models missing from the catalog
pub const DEFAULT_COST_PER_1K: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTag {
    Creativity,
    Code,
    Multimodal,
    GeneralKnowledge,
    Reasoning,
    Analysis,
    LongContext,
    /// Listed for some models but earns no routing bonus
    LargeContext,
    Safety,
    Speed,
    CostEfficiency,
    UpToDate,
    Balance,
}

impl fmt::Display for CapabilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapabilityTag::Creativity => "creativity",
            CapabilityTag::Code => "code",
            CapabilityTag::Multimodal => "multimodal",
            CapabilityTag::GeneralKnowledge => "general_knowledge",
            CapabilityTag::Reasoning => "reasoning",
            CapabilityTag::Analysis => "analysis",
            CapabilityTag::LongContext => "long_context",
            CapabilityTag::LargeContext => "large_context",
            CapabilityTag::Safety => "safety",
            CapabilityTag::Speed => "speed",
            CapabilityTag::CostEfficiency => "cost_efficiency",
            CapabilityTag::UpToDate => "up_to_date",
            CapabilityTag::Balance => "balance",
        };
        f.write_str(s)
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub id: String,
    pub display_name: String,
    pub provider: String,
    pub tags: Vec<CapabilityTag>,
    /// Context window in tokens
    pub max_tokens: u64,
    pub cost_per_1k: f64,
}

impl ModelProfile {
    pub fn new(id: &str, display_name: &str, provider: &str, tags: &[CapabilityTag]) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            provider: provider.to_string(),
            tags: tags.to_vec(),
            max_tokens: 0,
            cost_per_1k: DEFAULT_COST_PER_1K,
        }
    }

    pub fn with_limits(mut self, max_tokens: u64, cost_per_1k: f64) -> Self {
        self.max_tokens = max_tokens;
        self.cost_per_1k = cost_per_1k;
        self
    }

    pub fn has_tag(&self, tag: CapabilityTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Ordered catalog; declaration order is the auto strategy's tie-break order
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    profiles: Vec<ModelProfile>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        use CapabilityTag::*;

        Self::from_profiles(vec![
            ModelProfile::new(
                "gpt-4o",
                "GPT-4o",
                "OpenAI",
                &[Creativity, Code, Multimodal, GeneralKnowledge],
            )
            .with_limits(128_000, 0.01),
            ModelProfile::new(
                "claude-opus-4",
                "Claude Opus 4",
                "Anthropic",
                &[Reasoning, Analysis, LongContext, Safety],
            )
            .with_limits(200_000, 0.015),
            ModelProfile::new(
                "gemini-flash-2.5",
                "Gemini Flash 2.5",
                "Google",
                &[Speed, Multimodal, LargeContext, CostEfficiency],
            )
            .with_limits(1_000_000, 0.005),
            ModelProfile::new(
                "gpt-4-turbo",
                "GPT-4 Turbo",
                "OpenAI",
                &[Code, Reasoning, UpToDate],
            )
            .with_limits(128_000, 0.008),
            ModelProfile::new(
                "claude-3-sonnet",
                "Claude 3 Sonnet",
                "Anthropic",
                &[Balance, Speed, CostEfficiency],
            )
            .with_limits(200_000, 0.003),
        ])
    }

    pub fn from_profiles(profiles: Vec<ModelProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, id: &str) -> Option<&ModelProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Tags for a model; unknown models have none
    pub fn tags(&self, id: &str) -> &[CapabilityTag] {
        self.get(id).map(|p| p.tags.as_slice()).unwrap_or(&[])
    }

    pub fn cost_per_1k(&self, id: &str) -> f64 {
        self.get(id).map(|p| p.cost_per_1k).unwrap_or(DEFAULT_COST_PER_1K)
    }

    /// Declaration index, used for tie-breaking
    pub fn position(&self, id: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.id == id)
    }

    pub fn list_models(&self) -> &[ModelProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order_and_costs() {
        let catalog = ModelCatalog::builtin();
        let ids: Vec<&str> = catalog.list_models().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["gpt-4o", "claude-opus-4", "gemini-flash-2.5", "gpt-4-turbo", "claude-3-sonnet"]
        );
        assert_eq!(catalog.cost_per_1k("claude-opus-4"), 0.015);
        assert_eq!(catalog.cost_per_1k("unknown-model"), DEFAULT_COST_PER_1K);
    }

    #[test]
    fn test_unknown_model_has_no_tags() {
        let catalog = ModelCatalog::builtin();
        assert!(catalog.tags("my-local-model").is_empty());
        assert!(catalog.get("gpt-4-turbo").unwrap().has_tag(CapabilityTag::Code));
        assert_eq!(catalog.position("gpt-4-turbo"), Some(3));
    }

    #[test]
    fn test_tag_serialization() {
        let json = serde_json::to_string(&CapabilityTag::GeneralKnowledge).unwrap();
        assert_eq!(json, "\"general_knowledge\"");
        assert_eq!(CapabilityTag::UpToDate.to_string(), "up_to_date");
    }
}
