use crate::config::{Config, LLMProvider};
use crate::session::AnalysisMethod;
use clap::Parser;
use std::path::PathBuf;

/// whydig - guided root-cause analysis interviews driven by an LLM
#[derive(Parser, Debug)]
#[command(name = "whydig")]
#[command(
    about = "Interviews you about a problem using the 5 Whys or Ishikawa method and produces a structured root-cause report."
)]
#[command(version)]
pub struct Args {
    /// Analysis method (why5, ishikawa)
    #[arg(default_value = "why5")]
    pub method: String,

    /// Problem to analyze; asked interactively when omitted
    #[arg(short, long)]
    pub problem: Option<String>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose progress output
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM provider (openai, deepseek, anthropic; local/ollama map to openai)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API base URL
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API key
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// Response token cap
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Planning turns allowed before the session is wrapped up
    #[arg(long)]
    pub turn_budget: Option<u32>,
}

impl Args {
    /// Resolves CLI arguments into the effective configuration.
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            Config::from_file(config_path).unwrap_or_else(|_| {
                panic!("⚠️ Cannot read config file {:?}", config_path)
            })
        } else {
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."))
                .join("whydig.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|_| {
                    panic!("⚠️ Cannot read config file {:?}", default_config_path)
                })
            } else {
                Config::default()
            }
        };

        match self.method.parse::<AnalysisMethod>() {
            Ok(method) => config.method = method,
            Err(_) => {
                eprintln!(
                    "⚠️ Unknown method: {}, falling back to {}",
                    self.method, config.method
                );
            }
        }

        if let Some(problem) = self.problem {
            config.problem = Some(problem);
        }

        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ Unknown provider: {}, using default provider",
                    provider_str
                );
            }
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(turn_budget) = self.turn_budget {
            config.session.turn_budget = turn_budget;
        }

        config.verbose = config.verbose || self.verbose;

        config
    }
}
