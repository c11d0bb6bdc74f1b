use super::print_json;
use super::orchestrate::cancel_on_ctrl_c;
use crate::context::AppContext;
use crate::progress::Spinner;
use anyhow::Result;
use clap::Args;
use console::style;
use llm::ChatMessage;
use router::{ChatEngine, InMemoryHistory, OrchestrationContext, RoutingStrategy};
use std::sync::Arc;

const CLI_CONVERSATION: &str = "cli";

#[derive(Debug, Args)]
pub struct ChatCommand {
    pub message: String,

    /// Earlier user message, oldest first; repeatable
    #[arg(long = "history")]
    pub history: Vec<String>,

    #[arg(long)]
    pub primary: Option<String>,

    #[arg(long)]
    pub strategy: Option<RoutingStrategy>,

    /// Use the emotion model overlay
    #[arg(long)]
    pub overlay: bool,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl ChatCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let history = Arc::new(InMemoryHistory::new());
        for text in &self.history {
            history.append(CLI_CONVERSATION, ChatMessage::user(text.clone()));
        }

        let engine = ChatEngine::new(Arc::new(ctx.selector(self.seed)), ctx.emotion_analyzer(self.overlay))
            .with_history(history);

        let mut routing = ctx.config.routing_config();
        if let Some(primary) = &self.primary {
            routing.primary_model = primary.clone();
        }
        if let Some(strategy) = self.strategy {
            routing.strategy = strategy;
        }

        let request = OrchestrationContext::new();
        let _cancel_guard = cancel_on_ctrl_c(&request);

        let spinner = Spinner::start("Thinking...");
        let turn = engine
            .respond(Some(CLI_CONVERSATION), &self.message, &routing, Some(&request))
            .await;

        let turn = match turn {
            Ok(turn) => {
                spinner.finish_and_clear();
                turn
            }
            Err(e) => {
                spinner.finish_error("Chat request failed");
                return Err(e.into());
            }
        };

        if turn.escalate {
            eprintln!("{}", style("⚠ Escalation to a human is recommended").yellow().bold());
        }

        print_json(&turn)
    }
}
