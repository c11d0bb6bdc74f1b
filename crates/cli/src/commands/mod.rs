pub mod chat;
pub mod config;
pub mod emotion;
pub mod models;
pub mod orchestrate;

pub use chat::ChatCommand;
pub use config::ConfigCommand;
pub use emotion::{AdaptCommand, EmotionCommand, EscalateCommand, ReplyCommand};
pub use models::ModelsCommand;
pub use orchestrate::OrchestrateCommand;

use anyhow::{Context, Result};
use serde::Serialize;

/// Results go to stdout as pretty JSON; everything else goes to stderr
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// `MODEL=WEIGHT` pairs for the manual strategy
pub(crate) fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (model, weight) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MODEL=WEIGHT, got '{raw}'"))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight for {model}: {e}"))?;
    Ok((model.trim().to_string(), weight))
}
