use super::print_json;
use crate::context::AppContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use infrastructure::config::{ConfigLoader, ConfigSource};
use serde_json::json;

#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Print an example config file
    Example,

    /// Load and validate the active configuration
    #[command(visible_alias = "check")]
    Validate,
}

impl ConfigCommand {
    /// Example output needs no loaded configuration
    pub fn needs_context(&self) -> bool {
        !matches!(self.command, ConfigSubcommand::Example)
    }

    pub fn execute(self, ctx: Option<&AppContext>) -> Result<()> {
        match (self.command, ctx) {
            (ConfigSubcommand::Example, _) => {
                print!("{}", ConfigLoader::generate_example_config());
                Ok(())
            }
            (ConfigSubcommand::Validate, Some(ctx)) => {
                let source = match &ctx.source {
                    ConfigSource::File(path) => path.display().to_string(),
                    ConfigSource::Default => "defaults".to_string(),
                };
                print_json(&json!({
                    "valid": true,
                    "source": source,
                    "configuredProviders": ctx.config.providers.configured(),
                    "defaultProvider": ctx.config.providers.default_provider,
                    "routing": ctx.config.routing_config(),
                }))
            }
            (ConfigSubcommand::Validate, None) => {
                anyhow::bail!("configuration was not loaded")
            }
        }
    }
}
