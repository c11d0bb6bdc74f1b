use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::commands::{
    AdaptCommand, ChatCommand, ConfigCommand, EmotionCommand, EscalateCommand, ModelsCommand,
    OrchestrateCommand, ReplyCommand,
};
use cli::AppContext;
use common::init_structured_logging;
use console::style;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Multi-model orchestration with emotion-aware chat")]
#[command(version)]
struct Cli {
    /// Config file to load instead of searching the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a prompt to the best model and print the result
    Orchestrate(OrchestrateCommand),
    /// Analyze the emotion and tone of a text
    Emotion(EmotionCommand),
    /// Suggest a communication style for a text
    Adapt(AdaptCommand),
    /// Decide whether a message should go to a human
    Escalate(EscalateCommand),
    /// Generate an empathetic reply
    Reply(ReplyCommand),
    /// One chat turn: orchestration plus emotion, style and escalation
    Chat(ChatCommand),
    /// List the model catalog
    #[command(visible_alias = "ls")]
    Models(ModelsCommand),
    /// Inspect configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Commands::Config(command) if !command.needs_context() => return command.execute(None),
        other => other,
    };

    let ctx = AppContext::load(cli.config.as_deref()).await?;

    let mut logging = ctx.config.logging.clone();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    logging.json_output |= cli.json_logs;
    init_structured_logging(&logging)?;

    match command {
        Commands::Orchestrate(command) => command.execute(&ctx).await,
        Commands::Emotion(command) => command.execute(&ctx).await,
        Commands::Adapt(command) => command.execute(&ctx).await,
        Commands::Escalate(command) => command.execute(&ctx).await,
        Commands::Reply(command) => command.execute(&ctx).await,
        Commands::Chat(command) => command.execute(&ctx).await,
        Commands::Models(command) => command.execute(&ctx),
        Commands::Config(command) => command.execute(Some(&ctx)),
    }
}
