use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::session::AnalysisMethod;

/// LLM provider backing the reasoning agent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    /// Any OpenAI-compatible endpoint; the default targets a local
    /// LM Studio server, which is also how Ollama is reached.
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "local" | "ollama" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "anthropic" => Ok(LLMProvider::Anthropic),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Application configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Analysis method driving the interview.
    pub method: AnalysisMethod,

    /// Problem statement; elicited from the respondent when absent.
    pub problem: Option<String>,

    /// LLM connection settings.
    pub llm: LLMConfig,

    /// Dialogue bounds.
    pub session: SessionConfig,

    /// Verbose progress output.
    pub verbose: bool,
}

/// LLM connection settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider type.
    pub provider: LLMProvider,

    /// API key.
    pub api_key: String,

    /// API base URL.
    pub api_base_url: String,

    /// Model name.
    pub model: String,

    /// Response token cap.
    pub max_tokens: u32,

    /// Sampling temperature; kept low so the interview stays focused.
    pub temperature: f64,

    /// Transport retry attempts.
    pub retry_attempts: u32,

    /// Delay between retries (milliseconds).
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds).
    pub timeout_seconds: u64,
}

/// Dialogue bounds enforced by the driver and the extractor.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Planning turns allowed before the session is forced to conclude.
    pub turn_budget: u32,

    /// Maximum 5-Whys descent depth.
    pub max_chain_depth: usize,

    /// Validation retries for planner steps and for the final report.
    pub extraction_retries: u32,

    /// Ishikawa questions per category before moving on.
    pub questions_per_category: u32,
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_else(|_| String::from("EMPTY")),
            api_base_url: std::env::var("LLM_API_BASE_URL")
                .unwrap_or_else(|_| String::from("http://localhost:1234/v1")),
            model: std::env::var("MODEL")
                .unwrap_or_else(|_| String::from("Bielik-4.5B-v3.0-Instruct.Q8_0.gguf")),
            max_tokens: 2048,
            temperature: 0.1,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            timeout_seconds: 120,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_budget: 15,
            max_chain_depth: 5,
            extraction_retries: 2,
            questions_per_category: 2,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
