#[cfg(test)]
mod tests {
    use common::ConfigError;
    use infrastructure::config::{ConfigLoader, ConfigSource, ForgeConfig};
    use router::{LoadBalanceMode, RoutingStrategy};
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;
    use tokio::fs;

    fn isolated_loader() -> ConfigLoader {
        ConfigLoader::new().with_search_paths(Vec::new()).without_dotenv()
    }

    #[tokio::test]
    #[serial]
    async fn test_defaults_without_files() -> anyhow::Result<()> {
        let (config, source) = isolated_loader().load_with_source().await?;

        assert_eq!(source, ConfigSource::Default);
        assert_eq!(config.routing.primary_model, "gpt-4o");
        assert_eq!(config.routing.strategy, RoutingStrategy::Auto);
        assert_eq!(config.logging.level, "info");
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_config_loader_from_toml() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("forge.toml");

        let toml_content = r#"
[providers]
default_provider = "openai"

[providers.openai]
api_key = "sk-file"

[timeouts]
connect_secs = 5
total_secs = 20

[routing]
primary_model = "claude-3-sonnet"
secondary_models = ["gpt-4-turbo"]
strategy = "load_balance"
load_balance_mode = "wall_clock"

[emotion]
overlay_enabled = true

[logging]
level = "debug"
json_output = true
"#;
        fs::write(&config_path, toml_content).await?;

        let (config, source) = isolated_loader().with_path(&config_path).load_with_source().await?;

        assert_eq!(source, ConfigSource::File(config_path));
        assert_eq!(config.providers.default_provider, "openai");
        assert_eq!(config.providers.openai.api_key(), Some("sk-file"));
        assert_eq!(config.timeouts.total_secs, 20);
        assert_eq!(config.routing.primary_model, "claude-3-sonnet");
        assert_eq!(config.routing.strategy, RoutingStrategy::LoadBalance);
        assert_eq!(config.routing.load_balance_mode, LoadBalanceMode::WallClock);
        assert_eq!(config.routing.max_tokens, 2000);
        assert_eq!(config.overlay_settings().unwrap().model, "gpt-4o");
        assert!(config.logging.json_output);
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_config_loader_from_json() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("forge.json");

        let json_content = r#"{
  "routing": { "primary_model": "gemini-flash-2.5", "temperature": 0.2 },
  "models": [ { "id": "gemini-flash-2.5", "tags": ["speed"], "cost_per_1k": 0.001 } ]
}"#;
        fs::write(&config_path, json_content).await?;

        let config = isolated_loader().with_path(&config_path).load().await?;

        assert_eq!(config.routing.primary_model, "gemini-flash-2.5");
        assert!((config.routing.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.catalog().len(), 1);
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_search_paths_take_first_existing() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("missing.toml");
        let present = temp_dir.path().join(".forgerc.toml");
        fs::write(&present, "[routing]\nprimary_model = \"gpt-4-turbo\"\n").await?;

        let config = ConfigLoader::new()
            .with_search_paths(vec![missing, present])
            .without_dotenv()
            .load()
            .await?;

        assert_eq!(config.routing.primary_model, "gpt-4-turbo");
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_explicit_path_errors_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("forge.toml");
        fs::write(&broken, "[routing\nprimary_model = ").await.unwrap();

        let err = isolated_loader().with_path(&broken).load().await.unwrap_err();
        assert!(err.chain().any(|c| c.downcast_ref::<ConfigError>().is_some()));

        let missing = temp_dir.path().join("nope.toml");
        assert!(isolated_loader().with_path(missing).load().await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_env_overrides() -> anyhow::Result<()> {
        env::set_var("FORGETEST_PRIMARY_MODEL", "claude-opus-4");
        env::set_var("FORGETEST_SECONDARY_MODELS", "gpt-4o,gemini-flash-2.5");
        env::set_var("FORGETEST_STRATEGY", "manual");
        env::set_var("FORGETEST_TOTAL_TIMEOUT_SECS", "45");
        env::set_var("FORGETEST_OVERLAY_ENABLED", "true");
        env::set_var("FORGETEST_LOG_LEVEL", "trace");

        let result = isolated_loader().with_env_prefix("FORGETEST_").load().await;

        for var in [
            "PRIMARY_MODEL",
            "SECONDARY_MODELS",
            "STRATEGY",
            "TOTAL_TIMEOUT_SECS",
            "OVERLAY_ENABLED",
            "LOG_LEVEL",
        ] {
            env::remove_var(format!("FORGETEST_{var}"));
        }

        let config = result?;
        assert_eq!(config.routing.primary_model, "claude-opus-4");
        assert_eq!(config.routing.secondary_models, vec!["gpt-4o", "gemini-flash-2.5"]);
        assert_eq!(config.routing.strategy, RoutingStrategy::Manual);
        assert_eq!(config.timeouts.total_secs, 45);
        assert!(config.emotion.overlay_enabled);
        assert_eq!(config.logging.level, "trace");
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_env_strategy_is_rejected() {
        env::set_var("FORGEBAD_STRATEGY", "fastest");
        let result = isolated_loader().with_env_prefix("FORGEBAD_").load().await;
        env::remove_var("FORGEBAD_STRATEGY");

        assert!(result.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_api_key_env_override() -> anyhow::Result<()> {
        env::set_var("OPENAI_API_KEY", "test-openai-key");
        env::set_var("ZAI_API_KEY", "   ");

        let result = isolated_loader().load().await;

        env::remove_var("OPENAI_API_KEY");
        env::remove_var("ZAI_API_KEY");

        let config = result?;
        assert_eq!(config.providers.openai.api_key(), Some("test-openai-key"));
        assert_eq!(config.providers.zai.api_key(), None);
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_validation_runs_after_overrides() {
        env::set_var("FORGEVAL_TEMPERATURE", "3.5");
        let result = isolated_loader().with_env_prefix("FORGEVAL_").load().await;
        env::remove_var("FORGEVAL_TEMPERATURE");

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("routing.temperature"));
    }

    #[tokio::test]
    async fn test_save_config_round_trips() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("forge.toml");

        let mut config = ForgeConfig::default();
        config.routing.primary_model = "test-model".to_string();
        config.routing.max_tokens = 999;

        let loader = isolated_loader();
        loader.save_config(&config, &config_path).await?;

        let content = fs::read_to_string(&config_path).await?;
        assert!(content.contains("test-model"));
        assert!(content.contains("999"));

        let reloaded = isolated_loader().with_path(&config_path).load().await;
        assert_eq!(reloaded?.routing.max_tokens, 999);
        Ok(())
    }
}
