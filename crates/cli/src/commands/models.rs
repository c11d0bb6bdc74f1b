use super::print_json;
use crate::context::AppContext;
use anyhow::Result;
use clap::Args;
use router::ModelProfile;

#[derive(Debug, Args)]
pub struct ModelsCommand {
    /// Only models carrying this capability tag, e.g. `code`
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Only models from this provider
    #[arg(short, long)]
    pub provider: Option<String>,
}

impl ModelsCommand {
    pub fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.config.catalog();
        let models: Vec<&ModelProfile> = catalog
            .list_models()
            .iter()
            .filter(|m| self.matches(m))
            .collect();

        print_json(&models)
    }

    fn matches(&self, model: &ModelProfile) -> bool {
        let tag_ok = self
            .tag
            .as_deref()
            .map_or(true, |tag| model.tags.iter().any(|t| t.to_string().eq_ignore_ascii_case(tag)));
        let provider_ok = self
            .provider
            .as_deref()
            .map_or(true, |p| model.provider.eq_ignore_ascii_case(p));
        tag_ok && provider_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router::ModelCatalog;

    #[test]
    fn test_filters() {
        let catalog = ModelCatalog::builtin();
        let command = ModelsCommand {
            tag: Some("CODE".to_string()),
            provider: Some("openai".to_string()),
        };

        let ids: Vec<&str> = catalog
            .list_models()
            .iter()
            .filter(|m| command.matches(m))
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["gpt-4o", "gpt-4-turbo"]);
    }
}
