use super::print_json;
use crate::context::AppContext;
use crate::progress::Spinner;
use anyhow::Result;
use clap::Args;
use console::style;
use empathy::{
    adapt_communication, CommunicationAdaptation, EmotionAnalysis, EmpatheticResponder,
    EscalationChecks, EscalationPolicy,
};
use llm::ChatMessage;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct EmotionCommand {
    pub text: String,

    /// Layer the model's opinion over the keyword analysis
    #[arg(long)]
    pub overlay: bool,
}

impl EmotionCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let analysis = ctx.emotion_analyzer(self.overlay).analyze(&self.text).await;
        print_json(&analysis)
    }
}

#[derive(Debug, Args)]
pub struct AdaptCommand {
    pub text: String,

    #[arg(long)]
    pub overlay: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdaptOutput {
    emotion: EmotionAnalysis,
    adaptation: CommunicationAdaptation,
}

impl AdaptCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let emotion = ctx.emotion_analyzer(self.overlay).analyze(&self.text).await;
        let adaptation = adapt_communication(&emotion);
        print_json(&AdaptOutput { emotion, adaptation })
    }
}

#[derive(Debug, Args)]
pub struct EscalateCommand {
    pub message: String,

    /// Earlier user message, oldest first; repeatable
    #[arg(long = "history")]
    pub history: Vec<String>,

    #[arg(long)]
    pub overlay: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EscalateOutput {
    escalate: bool,
    checks: EscalationChecks,
    emotion: EmotionAnalysis,
}

impl EscalateCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let emotion = ctx.emotion_analyzer(self.overlay).analyze(&self.message).await;
        let history: Vec<ChatMessage> = self.history.iter().map(ChatMessage::user).collect();

        let checks = EscalationPolicy::evaluate(&self.message, &emotion, Some(&history));
        let escalate = checks.any();
        if escalate {
            eprintln!("{}", style("⚠ Escalation to a human is recommended").yellow().bold());
        }

        print_json(&EscalateOutput {
            escalate,
            checks,
            emotion,
        })
    }
}

#[derive(Debug, Args)]
pub struct ReplyCommand {
    pub message: String,

    /// Conversation context passed to the model
    #[arg(long)]
    pub context: Option<String>,

    /// Model to answer with; defaults to the routing primary
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub overlay: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyOutput {
    emotion: EmotionAnalysis,
    reply: String,
}

impl ReplyCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let emotion = ctx.emotion_analyzer(self.overlay).analyze(&self.message).await;

        let model = self
            .model
            .clone()
            .unwrap_or_else(|| ctx.config.routing.primary_model.clone());
        let responder = EmpatheticResponder::new(ctx.backend(), model);

        let spinner = Spinner::start("Composing reply...");
        let reply = responder
            .generate_empathetic_response(&self.message, &emotion, self.context.as_deref())
            .await;
        spinner.finish_and_clear();

        print_json(&ReplyOutput { emotion, reply })
    }
}
