use super::{parse_weight, print_json};
use crate::context::AppContext;
use crate::progress::Spinner;
use anyhow::Result;
use clap::Args;
use llm::ChatMessage;
use router::{OrchestrationContext, RoutingConfig, RoutingStrategy};
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct OrchestrateCommand {
    /// Prompt sent as a user message
    pub prompt: String,

    /// Optional system message placed before the prompt
    #[arg(long)]
    pub system: Option<String>,

    #[arg(long)]
    pub primary: Option<String>,

    /// Secondary model; repeatable
    #[arg(long = "secondary")]
    pub secondaries: Vec<String>,

    /// auto, manual or load_balance
    #[arg(long)]
    pub strategy: Option<RoutingStrategy>,

    /// MODEL=WEIGHT for the manual strategy; repeatable
    #[arg(long = "weight", value_parser = parse_weight)]
    pub weights: Vec<(String, f64)>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Seed for reproducible manual draws
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub request_id: Option<String>,
}

impl OrchestrateCommand {
    /// Configured defaults with the command-line overrides applied
    pub fn routing_config(&self, ctx: &AppContext) -> RoutingConfig {
        let mut config = ctx.config.routing_config();

        if let Some(primary) = &self.primary {
            config.primary_model = primary.clone();
        }
        if !self.secondaries.is_empty() {
            config.secondary_models = self.secondaries.clone();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        for (model, weight) in &self.weights {
            config.model_weights.insert(model.clone(), *weight);
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }

        config
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(self.prompt.clone()));
        messages
    }

    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let routing = self.routing_config(ctx);
        debug!("Routing config: {:?}", routing);

        let selector = ctx.selector(self.seed);
        let mut request = OrchestrationContext::new();
        if let Some(id) = &self.request_id {
            request = request.with_request_id(id.clone());
        }
        let _cancel_guard = cancel_on_ctrl_c(&request);

        let spinner = Spinner::start(&format!("Orchestrating with {} strategy...", routing.strategy));
        let outcome = selector
            .orchestrate(&self.messages(), &routing, Some(&request))
            .await;

        match outcome {
            Ok(result) => {
                spinner.finish_success(&format!("Answered by {}", result.model_used));
                print_json(&result)
            }
            Err(e) => {
                spinner.finish_error("Orchestration failed");
                Err(e.into())
            }
        }
    }
}

/// Aborts the Ctrl-C watcher when dropped
pub(crate) struct CtrlCGuard(tokio::task::JoinHandle<()>);

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Cancels the request on Ctrl-C while the guard is alive
pub(crate) fn cancel_on_ctrl_c(request: &OrchestrationContext) -> CtrlCGuard {
    let token = request.cancellation_token();
    CtrlCGuard(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            token.cancel();
        }
    }))
}
