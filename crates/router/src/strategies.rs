//! Routing strategies: auto (capability match + fan-out arbitration), manual
//! (weighted random) and load-balance (round robin).

use crate::catalog::{CapabilityTag, ModelCatalog};
use crate::config::RoutingConfig;
use crate::content::{ContentAnalyzer, ContentSignals};
use crate::scorer::ResponseScorer;
use async_trait::async_trait;
use common::{ProviderError, SelectionError};
use futures::future::join_all;
use llm::{BackendResponse, ChatMessage, GenerationParams, LlmBackend};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Below this auto confidence the secondaries are consulted
pub const FAN_OUT_THRESHOLD: f64 = 0.7;
/// At most this many secondaries are invoked per orchestration
pub const MAX_SECONDARY_CALLS: usize = 2;
pub const ARBITRATED_CONFIDENCE: f64 = 0.8;
pub const MANUAL_CONFIDENCE: f64 = 0.8;
pub const LOAD_BALANCE_CONFIDENCE: f64 = 0.75;

/// Failure inside a strategy; triggers the primary fallback
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StrategyError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Everything a strategy needs for one request
pub struct StrategyRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub config: &'a RoutingConfig,
    pub backend: &'a dyn LlmBackend,
    pub params: &'a GenerationParams,
}

/// Chosen model with its response
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub model: String,
    pub response: BackendResponse,
    pub confidence: f64,
}

#[async_trait]
pub trait SelectionStrategy: Send + Sync {
    async fn execute(&self, request: &StrategyRequest<'_>) -> Result<StrategyOutcome, StrategyError>;

    /// Strategy name for logging and debugging
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn validate_context(&self, request: &StrategyRequest<'_>) -> Result<(), StrategyError> {
        request.config.validate()?;
        Ok(())
    }
}

/// Integer capability-match score of one model for the given signals
pub fn capability_score(signals: &ContentSignals, tags: &[CapabilityTag], is_primary: bool) -> u32 {
    let has = |tag: CapabilityTag| tags.contains(&tag);
    let mut score = 0;

    if signals.has_code && has(CapabilityTag::Code) {
        score += 3;
    }
    if signals.has_math && has(CapabilityTag::Reasoning) {
        score += 2;
    }
    if signals.is_creative && has(CapabilityTag::Creativity) {
        score += 3;
    }
    if signals.is_analytical && has(CapabilityTag::Analysis) {
        score += 3;
    }
    if signals.is_technical && has(CapabilityTag::Code) {
        score += 2;
    }
    if signals.requires_vision && has(CapabilityTag::Multimodal) {
        score += 4;
    }
    if signals.requires_long_context && has(CapabilityTag::LongContext) {
        score += 3;
    }
    if is_primary {
        score += 1;
    }

    score
}

/// Confidence that a model with these tags fits the request, in [0.5, 1.0]
pub fn selection_confidence(signals: &ContentSignals, tags: &[CapabilityTag]) -> f64 {
    let has = |tag: CapabilityTag| tags.contains(&tag);
    let mut confidence: f64 = 0.5;

    if signals.has_code && has(CapabilityTag::Code) {
        confidence += 0.2;
    }
    if signals.has_math && has(CapabilityTag::Reasoning) {
        confidence += 0.15;
    }
    if signals.is_creative && has(CapabilityTag::Creativity) {
        confidence += 0.2;
    }
    if signals.requires_vision && has(CapabilityTag::Multimodal) {
        confidence += 0.25;
    }
    if signals.requires_long_context && has(CapabilityTag::LongContext) {
        confidence += 0.15;
    }

    confidence.min(1.0)
}

/// Price discount applied during arbitration, floored at 0
pub fn cost_discount(cost_per_1k: f64) -> f64 {
    (1.0 - cost_per_1k * 10.0).max(0.0)
}

/// Capability-matching strategy with secondary fan-out for low-confidence picks
pub struct AutoStrategy {
    catalog: Arc<ModelCatalog>,
}

impl AutoStrategy {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Self { catalog }
    }

    /// Candidates in tie-break order: catalog declaration order first, unknown models after
    fn ordered_candidates(&self, config: &RoutingConfig) -> Vec<String> {
        let mut known: Vec<(usize, String)> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();

        for model in config.candidates() {
            match self.catalog.position(&model) {
                Some(pos) => known.push((pos, model)),
                None => unknown.push(model),
            }
        }

        known.sort_by_key(|(pos, _)| *pos);
        known.into_iter().map(|(_, m)| m).chain(unknown).collect()
    }

    /// First-declared model with the highest capability score
    pub fn select_model(&self, signals: &ContentSignals, config: &RoutingConfig) -> Option<String> {
        let mut best: Option<(u32, String)> = None;

        for model in self.ordered_candidates(config) {
            let score = capability_score(
                signals,
                self.catalog.tags(&model),
                model == config.primary_model,
            );
            debug!("Capability score for {}: {}", model, score);

            if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                best = Some((score, model));
            }
        }

        best.map(|(_, model)| model)
    }

    fn weighted_score(&self, response: &BackendResponse, model: &str, signals: &ContentSignals) -> f64 {
        ResponseScorer::score(&response.content, signals) * cost_discount(self.catalog.cost_per_1k(model))
    }
}

#[async_trait]
impl SelectionStrategy for AutoStrategy {
    async fn execute(&self, request: &StrategyRequest<'_>) -> Result<StrategyOutcome, StrategyError> {
        self.validate_context(request)?;

        let signals = ContentAnalyzer::analyze(request.messages);
        let selected = self
            .select_model(&signals, request.config)
            .ok_or(SelectionError::NoCandidates)?;

        info!("🎯 Auto strategy selected {}", selected);

        let response = request
            .backend
            .generate(request.messages, &selected, request.params)
            .await?;

        let confidence = selection_confidence(&signals, self.catalog.tags(&selected));
        let mut outcome = StrategyOutcome {
            model: selected.clone(),
            response,
            confidence,
        };

        let alternates: Vec<String> = request
            .config
            .unique_secondaries()
            .into_iter()
            .filter(|m| *m != selected)
            .take(MAX_SECONDARY_CALLS)
            .collect();

        if confidence >= FAN_OUT_THRESHOLD || alternates.is_empty() {
            return Ok(outcome);
        }

        info!(
            "🔀 Confidence {:.2} below {:.2}, consulting {} secondary model(s)",
            confidence,
            FAN_OUT_THRESHOLD,
            alternates.len()
        );

        let calls = alternates.iter().map(|model| async move {
            let result = request
                .backend
                .generate(request.messages, model, request.params)
                .await;
            (model.clone(), result)
        });

        let mut best_score = self.weighted_score(&outcome.response, &selected, &signals);
        let mut winner: Option<(String, BackendResponse)> = None;

        for (model, result) in join_all(calls).await {
            match result {
                Ok(response) => {
                    let score = self.weighted_score(&response, &model, &signals);
                    debug!("Arbitration score for {}: {:.3}", model, score);
                    if score > best_score {
                        best_score = score;
                        winner = Some((model, response));
                    }
                }
                Err(e) => warn!("Dropping secondary {}: {}", model, e),
            }
        }

        if let Some((model, response)) = winner {
            info!("🏆 Secondary {} outscored {}", model, selected);
            outcome = StrategyOutcome {
                model,
                response,
                confidence: ARBITRATED_CONFIDENCE,
            };
        }

        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "auto"
    }

    fn description(&self) -> &'static str {
        "Matches content signals to model capabilities, arbitrating among secondaries when unsure"
    }
}

/// Weighted-random strategy over the configured candidates
pub struct ManualStrategy {
    rng: Mutex<StdRng>,
}

impl Default for ManualStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualStrategy {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Cumulative-weight draw; zero-weight candidates are never picked unless all weigh zero
    pub fn pick(&self, config: &RoutingConfig) -> Option<String> {
        let candidates = config.candidates();
        if candidates.is_empty() {
            return None;
        }

        let weights: Vec<f64> = candidates
            .iter()
            .map(|m| {
                let w = config.model_weights.get(m).copied().unwrap_or(1.0);
                if w.is_finite() {
                    w.max(0.0)
                } else {
                    0.0
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let mut rng = self.rng.lock();
        if total <= 0.0 {
            let index = rng.gen_range(0..candidates.len());
            return candidates.into_iter().nth(index);
        }

        let draw = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (model, weight) in candidates.iter().zip(&weights) {
            cumulative += weight;
            if *weight > 0.0 && draw < cumulative {
                return Some(model.clone());
            }
        }

        // Float rounding can leave the draw just past the last boundary
        candidates
            .iter()
            .zip(&weights)
            .rev()
            .find(|(_, w)| **w > 0.0)
            .map(|(m, _)| m.clone())
    }
}

#[async_trait]
impl SelectionStrategy for ManualStrategy {
    async fn execute(&self, request: &StrategyRequest<'_>) -> Result<StrategyOutcome, StrategyError> {
        self.validate_context(request)?;

        let model = self.pick(request.config).ok_or(SelectionError::NoCandidates)?;
        info!("🎲 Manual strategy drew {}", model);

        let response = request
            .backend
            .generate(request.messages, &model, request.params)
            .await?;

        Ok(StrategyOutcome {
            model,
            response,
            confidence: MANUAL_CONFIDENCE,
        })
    }

    fn name(&self) -> &'static str {
        "manual"
    }

    fn description(&self) -> &'static str {
        "Weighted random choice among the configured models"
    }
}

/// Source of round-robin positions
pub trait TickSource: Send + Sync {
    fn next_tick(&self) -> u64;
}

/// Monotonic counter, one tick per request
#[derive(Debug, Default)]
pub struct SequentialTicks {
    counter: AtomicU64,
}

impl SequentialTicks {
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl TickSource for SequentialTicks {
    fn next_tick(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

/// Current wall-clock second
#[derive(Debug, Default)]
pub struct WallClockTicks;

impl TickSource for WallClockTicks {
    fn next_tick(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalanceMode {
    #[default]
    Sequential,
    WallClock,
}

impl LoadBalanceMode {
    pub fn tick_source(&self) -> Arc<dyn TickSource> {
        match self {
            LoadBalanceMode::Sequential => Arc::new(SequentialTicks::default()),
            LoadBalanceMode::WallClock => Arc::new(WallClockTicks),
        }
    }
}

/// Round-robin strategy: candidate index = tick mod candidate count
pub struct LoadBalanceStrategy {
    ticks: Arc<dyn TickSource>,
}

impl Default for LoadBalanceStrategy {
    fn default() -> Self {
        Self::new(LoadBalanceMode::default())
    }
}

impl LoadBalanceStrategy {
    pub fn new(mode: LoadBalanceMode) -> Self {
        Self {
            ticks: mode.tick_source(),
        }
    }

    pub fn with_ticks(ticks: Arc<dyn TickSource>) -> Self {
        Self { ticks }
    }

    pub fn pick(&self, config: &RoutingConfig) -> Option<String> {
        let candidates = config.candidates();
        if candidates.is_empty() {
            return None;
        }
        let index = (self.ticks.next_tick() % candidates.len() as u64) as usize;
        candidates.into_iter().nth(index)
    }
}

#[async_trait]
impl SelectionStrategy for LoadBalanceStrategy {
    async fn execute(&self, request: &StrategyRequest<'_>) -> Result<StrategyOutcome, StrategyError> {
        self.validate_context(request)?;

        let model = self.pick(request.config).ok_or(SelectionError::NoCandidates)?;
        info!("⚖️ Load balance strategy routed to {}", model);

        let response = request
            .backend
            .generate(request.messages, &model, request.params)
            .await?;

        Ok(StrategyOutcome {
            model,
            response,
            confidence: LOAD_BALANCE_CONFIDENCE,
        })
    }

    fn name(&self) -> &'static str {
        "load_balance"
    }

    fn description(&self) -> &'static str {
        "Rotates requests across the configured models"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelProfile;
    use common::ProviderErrorKind;
    use llm::testing::ScriptedBackend;

    fn code_signals() -> ContentSignals {
        ContentSignals {
            has_code: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_capability_score_bonuses() {
        let signals = ContentSignals {
            has_code: true,
            is_technical: true,
            requires_vision: true,
            ..Default::default()
        };
        let tags = [CapabilityTag::Code, CapabilityTag::Multimodal];
        assert_eq!(capability_score(&signals, &tags, false), 9);
        assert_eq!(capability_score(&signals, &tags, true), 10);
        assert_eq!(capability_score(&signals, &[], true), 1);
    }

    #[test]
    fn test_large_context_earns_no_bonus() {
        let signals = ContentSignals {
            requires_long_context: true,
            ..Default::default()
        };
        assert_eq!(capability_score(&signals, &[CapabilityTag::LargeContext], false), 0);
        assert_eq!(capability_score(&signals, &[CapabilityTag::LongContext], false), 3);
    }

    #[test]
    fn test_selection_confidence_is_capped() {
        let signals = ContentSignals {
            has_code: true,
            has_math: true,
            is_creative: true,
            requires_vision: true,
            requires_long_context: true,
            ..Default::default()
        };
        let all = [
            CapabilityTag::Code,
            CapabilityTag::Reasoning,
            CapabilityTag::Creativity,
            CapabilityTag::Multimodal,
            CapabilityTag::LongContext,
        ];
        assert_eq!(selection_confidence(&signals, &all), 1.0);
        assert_eq!(selection_confidence(&ContentSignals::default(), &all), 0.5);
    }

    #[test]
    fn test_cost_discount_floor() {
        assert!((cost_discount(0.003) - 0.97).abs() < 1e-9);
        assert_eq!(cost_discount(0.1), 0.0);
        assert_eq!(cost_discount(0.5), 0.0);
    }

    #[test]
    fn test_auto_prefers_code_model() {
        let auto = AutoStrategy::new(Arc::new(ModelCatalog::builtin()));
        let config = RoutingConfig::new("claude-3-sonnet").with_secondaries(["gpt-4-turbo"]);
        assert_eq!(
            auto.select_model(&code_signals(), &config).as_deref(),
            Some("gpt-4-turbo")
        );
    }

    #[test]
    fn test_auto_tie_break_uses_catalog_order() {
        let auto = AutoStrategy::new(Arc::new(ModelCatalog::builtin()));
        // gpt-4o and gpt-4-turbo both carry "code"; primary bonus goes to neither.
        let config = RoutingConfig::new("unknown-model").with_secondaries(["gpt-4-turbo", "gpt-4o"]);
        assert_eq!(auto.select_model(&code_signals(), &config).as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_auto_primary_bonus_wins_ties() {
        let auto = AutoStrategy::new(Arc::new(ModelCatalog::builtin()));
        let config = RoutingConfig::new("claude-3-sonnet").with_secondaries(["claude-opus-4"]);
        let plain = ContentSignals::default();
        assert_eq!(auto.select_model(&plain, &config).as_deref(), Some("claude-3-sonnet"));
    }

    #[tokio::test]
    async fn test_auto_fan_out_drops_failed_secondary() {
        let catalog = ModelCatalog::from_profiles(vec![
            ModelProfile::new("a", "A", "Test", &[CapabilityTag::Analysis]).with_limits(1000, 0.0),
            ModelProfile::new("b", "B", "Test", &[CapabilityTag::Code]).with_limits(1000, 0.0),
            ModelProfile::new("c", "C", "Test", &[]).with_limits(1000, 0.0),
        ]);
        let auto = AutoStrategy::new(Arc::new(catalog));
        let backend = ScriptedBackend::new()
            .with_reply("a", "short")
            .with_reply("b", format!("Analysis: {}", "x".repeat(120)))
            .with_failure("c", ProviderErrorKind::Network);

        let messages = [ChatMessage::user("Please analyze these two options")];
        let config = RoutingConfig::new("a").with_secondaries(["b", "c"]);
        let params = config.generation_params();
        let request = StrategyRequest {
            messages: &messages,
            config: &config,
            backend: &backend,
            params: &params,
        };

        let outcome = auto.execute(&request).await.unwrap();
        assert_eq!(outcome.model, "b");
        assert_eq!(outcome.confidence, ARBITRATED_CONFIDENCE);
        assert_eq!(backend.call_count("c"), 1);
    }

    #[tokio::test]
    async fn test_auto_invokes_at_most_two_secondaries() {
        let auto = AutoStrategy::new(Arc::new(ModelCatalog::builtin()));
        let backend = ScriptedBackend::new().with_default_reply("ok");

        let messages = [ChatMessage::user("hello there")];
        let config = RoutingConfig::new("claude-3-sonnet").with_secondaries(["x", "y", "z", "w"]);
        let params = config.generation_params();
        let request = StrategyRequest {
            messages: &messages,
            config: &config,
            backend: &backend,
            params: &params,
        };

        let outcome = auto.execute(&request).await.unwrap();
        assert_eq!(outcome.model, "claude-3-sonnet");
        assert_eq!(backend.calls().len(), 3);
        assert_eq!(backend.call_count("z"), 0);
    }

    #[test]
    fn test_manual_zero_weight_never_picked() {
        let manual = ManualStrategy::with_seed(7);
        let config = RoutingConfig::new("a")
            .with_secondaries(["b"])
            .with_weight("a", 0.0)
            .with_weight("b", 1.0);
        for _ in 0..200 {
            assert_eq!(manual.pick(&config).as_deref(), Some("b"));
        }
    }

    #[test]
    fn test_manual_all_zero_weights_is_uniform() {
        let manual = ManualStrategy::with_seed(42);
        let config = RoutingConfig::new("a")
            .with_secondaries(["b"])
            .with_weight("a", 0.0)
            .with_weight("b", -3.0);
        let picks: Vec<String> = (0..100).filter_map(|_| manual.pick(&config)).collect();
        assert!(picks.iter().any(|m| m == "a"));
        assert!(picks.iter().any(|m| m == "b"));
    }

    #[test]
    fn test_manual_seed_is_reproducible() {
        let config = RoutingConfig::new("a").with_secondaries(["b", "c"]);
        let first: Vec<_> = {
            let m = ManualStrategy::with_seed(99);
            (0..20).map(|_| m.pick(&config)).collect()
        };
        let second: Vec<_> = {
            let m = ManualStrategy::with_seed(99);
            (0..20).map(|_| m.pick(&config)).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_balance_rotates() {
        let lb = LoadBalanceStrategy::with_ticks(Arc::new(SequentialTicks::default()));
        let config = RoutingConfig::new("a").with_secondaries(["b", "c"]);
        let picks: Vec<_> = (0..4).filter_map(|_| lb.pick(&config)).collect();
        assert_eq!(picks, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_load_balance_single_candidate() {
        let lb = LoadBalanceStrategy::with_ticks(Arc::new(SequentialTicks::starting_at(u64::MAX - 3)));
        let config = RoutingConfig::new("only");
        for _ in 0..3 {
            assert_eq!(lb.pick(&config).as_deref(), Some("only"));
        }

        let wall = LoadBalanceStrategy::new(LoadBalanceMode::WallClock);
        assert_eq!(wall.pick(&config).as_deref(), Some("only"));
    }
}
