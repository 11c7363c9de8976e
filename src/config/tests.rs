#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider, SessionConfig};
    use crate::session::AnalysisMethod;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.method, AnalysisMethod::FiveWhys);
        assert!(config.problem.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        // Aliases for OpenAI-compatible local servers.
        assert_eq!("local".parse::<LLMProvider>().unwrap(), LLMProvider::OpenAI);
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::Anthropic.to_string(), "anthropic");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        // api_key falls back to "EMPTY" for keyless local servers
        assert!(!config.api_key.is_empty());
        assert!(!config.api_base_url.is_empty());
        assert!(!config.model.is_empty());
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();

        assert_eq!(config.turn_budget, 15);
        assert_eq!(config.max_chain_depth, 5);
        assert_eq!(config.extraction_retries, 2);
        assert_eq!(config.questions_per_category, 2);
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("whydig.toml");

        let content = r#"method = "ishikawa"
problem = "Sprint commitments keep slipping"
verbose = true

[llm]
provider = "openai"
model = "gpt-4o-mini"
max_tokens = 1024

[session]
turn_budget = 20
questions_per_category = 1
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.method, AnalysisMethod::Ishikawa);
        assert_eq!(
            config.problem,
            Some("Sprint commitments keep slipping".to_string())
        );
        assert!(config.verbose);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 1024);
        // Unspecified fields keep their defaults.
        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.session.turn_budget, 20);
        assert_eq!(config.session.questions_per_category, 1);
        assert_eq!(config.session.max_chain_depth, 5);
    }

    #[test]
    fn test_config_from_missing_file() {
        let path = std::path::PathBuf::from("/nonexistent/whydig.toml");
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_config_from_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("whydig.toml");
        std::fs::write(&config_path, "method = [not toml").unwrap();

        assert!(Config::from_file(&config_path).is_err());
    }
}
