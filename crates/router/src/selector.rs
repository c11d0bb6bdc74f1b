use crate::catalog::ModelCatalog;
use crate::config::{RoutingConfig, RoutingStrategy};
use crate::recorder::{OrchestrationRecord, OrchestrationRecorder};
use crate::strategies::{
    AutoStrategy, LoadBalanceMode, LoadBalanceStrategy, ManualStrategy, SelectionStrategy,
    StrategyOutcome, StrategyRequest, TickSource,
};
use chrono::Utc;
use common::{new_request_id, OperationTimer, OrchestrationError};
use llm::{ChatMessage, LlmBackend, TokenUsage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

/// Confidence reported when the primary fallback served the request
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

/// What the caller gets back from one orchestration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub response: String,
    pub model_used: String,
    pub processing_time_seconds: f64,
    pub token_usage: TokenUsage,
    pub confidence: f64,
    pub strategy: RoutingStrategy,
    /// True when the strategy failed and the primary model answered directly
    pub fallback_used: bool,
}

/// Per-request correlation id and cancellation handle
#[derive(Debug, Clone)]
pub struct OrchestrationContext {
    pub request_id: String,
    cancel: CancellationToken,
}

impl Default for OrchestrationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationContext {
    pub fn new() -> Self {
        Self {
            request_id: new_request_id(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Strategy-based model selection with a one-shot primary fallback
pub struct ModelSelector {
    backend: Arc<dyn LlmBackend>,
    catalog: Arc<ModelCatalog>,
    auto: AutoStrategy,
    manual: ManualStrategy,
    load_balance: LoadBalanceStrategy,
    recorder: Option<Arc<dyn OrchestrationRecorder>>,
}

impl ModelSelector {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        let catalog = Arc::new(ModelCatalog::builtin());
        Self {
            backend,
            auto: AutoStrategy::new(catalog.clone()),
            catalog,
            manual: ManualStrategy::new(),
            load_balance: LoadBalanceStrategy::default(),
            recorder: None,
        }
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        let catalog = Arc::new(catalog);
        self.auto = AutoStrategy::new(catalog.clone());
        self.catalog = catalog;
        self
    }

    /// Reproducible manual-strategy draws
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.manual = ManualStrategy::with_seed(seed);
        self
    }

    pub fn with_load_balance_mode(mut self, mode: LoadBalanceMode) -> Self {
        self.load_balance = LoadBalanceStrategy::new(mode);
        self
    }

    pub fn with_tick_source(mut self, ticks: Arc<dyn TickSource>) -> Self {
        self.load_balance = LoadBalanceStrategy::with_ticks(ticks);
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn OrchestrationRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    fn strategy_for(&self, strategy: RoutingStrategy) -> &dyn SelectionStrategy {
        match strategy {
            RoutingStrategy::Auto => &self.auto,
            RoutingStrategy::Manual => &self.manual,
            RoutingStrategy::LoadBalance => &self.load_balance,
        }
    }

    /// Run the configured strategy; on any strategy failure retry once on the primary model
    pub async fn orchestrate(
        &self,
        messages: &[ChatMessage],
        config: &RoutingConfig,
        context: Option<&OrchestrationContext>,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let context = context.cloned().unwrap_or_default();
        let span = info_span!(
            "orchestrate",
            request_id = %context.request_id,
            strategy = %config.strategy
        );

        self.orchestrate_inner(messages, config, &context)
            .instrument(span)
            .await
    }

    async fn orchestrate_inner(
        &self,
        messages: &[ChatMessage],
        config: &RoutingConfig,
        context: &OrchestrationContext,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let mut timer = OperationTimer::new("orchestrate");
        timer.add_field("strategy", config.strategy.to_string());

        let params = config.generation_params();
        let strategy = self.strategy_for(config.strategy);
        let request = StrategyRequest {
            messages,
            config,
            backend: self.backend.as_ref(),
            params: &params,
        };

        let attempt = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => {
                warn!("Orchestration cancelled during {} strategy", strategy.name());
                return Err(OrchestrationError::Cancelled);
            }
            result = strategy.execute(&request) => result,
        };

        let (outcome, fallback_used) = match attempt {
            Ok(outcome) => (outcome, false),
            Err(strategy_error) => {
                warn!(
                    "Strategy {} failed ({}), falling back to primary {}",
                    strategy.name(),
                    strategy_error,
                    config.primary_model
                );

                let direct = tokio::select! {
                    biased;
                    _ = context.cancel.cancelled() => {
                        warn!("Orchestration cancelled during primary fallback");
                        return Err(OrchestrationError::Cancelled);
                    }
                    result = self.backend.generate(messages, &config.primary_model, &params) => result,
                };

                match direct {
                    Ok(response) => (
                        StrategyOutcome {
                            model: config.primary_model.clone(),
                            response,
                            confidence: FALLBACK_CONFIDENCE,
                        },
                        true,
                    ),
                    Err(cause) => {
                        let err = OrchestrationError::Failed {
                            cause,
                            strategy_error: strategy_error.to_string(),
                        };
                        error!("❌ Orchestration failed: {}", err);
                        timer.finish_with_result::<(), _>(&Err(&err));
                        return Err(err);
                    }
                }
            }
        };

        let processing_time_seconds = timer.elapsed_secs();
        let result = OrchestrationResult {
            response: outcome.response.content,
            model_used: outcome.model,
            processing_time_seconds,
            token_usage: outcome.response.usage,
            confidence: outcome.confidence.clamp(0.0, 1.0),
            strategy: config.strategy,
            fallback_used,
        };

        info!(
            model = %result.model_used,
            confidence = result.confidence,
            total_tokens = result.token_usage.total_tokens,
            fallback = fallback_used,
            "✅ Orchestration complete"
        );
        timer.finish_with_result::<(), String>(&Ok(()));

        if let Some(recorder) = &self.recorder {
            let record = OrchestrationRecord {
                request_id: context.request_id.clone(),
                recorded_at: Utc::now(),
                result: result.clone(),
            };
            if let Err(e) = recorder.record(record).await {
                warn!("Failed to record orchestration result: {}", e);
            }
        }

        Ok(result)
    }
}
