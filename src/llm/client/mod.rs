//! LLM client: one interface over the supported providers, with retry,
//! timeout and the `ReasoningBackend` wiring for the session layer.

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::report::{IshikawaReport, WhyChainReport};
use crate::session::{BackendError, PlanContext, PlannerStep, ReasoningBackend};

mod providers;

use providers::ProviderClient;

/// LLM client bound to one provider and model.
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Checks that the configured model actually answers.
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 Checking model connection...");
        match self
            .prompt("You are a helpful assistant.", "Hello")
            .await
        {
            Ok(_) => {
                println!("✅ Model connection OK: {}", self.config.model);
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ Model connection failed: {}", e);
                Err(e)
            }
        }
    }

    /// Retry loop shared by prompting and extraction. Schema-class errors
    /// are returned immediately: re-sending the identical request cannot fix
    /// a malformed structured reply, that is the session layer's job.
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let max_retries = self.config.retry_attempts;
        let retry_delay_ms = self.config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if is_schema_error(&err) {
                        return Err(err);
                    }
                    retries += 1;
                    eprintln!(
                        "❌ Model call failed, retrying ({} / {}): {}",
                        retries, max_retries, err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }

    /// Single-turn prompt without structured output.
    pub async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let agent = self
            .client
            .create_agent(&self.config.model, system_prompt, &self.config);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        self.retry_with_backoff(|| async {
            match tokio::time::timeout(timeout, agent.prompt(user_prompt)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "model call timed out after {}s",
                    self.config.timeout_seconds
                )),
            }
        })
        .await
    }

    /// Structured extraction into `T`.
    pub async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let extractor =
            self.client
                .create_extractor::<T>(&self.config.model, system_prompt, &self.config);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        self.retry_with_backoff(|| async {
            match tokio::time::timeout(timeout, extractor.extract(user_prompt)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "model call timed out after {}s",
                    self.config.timeout_seconds
                )),
            }
        })
        .await
    }
}

/// Whether the failure is the model producing unusable structured output,
/// as opposed to the call itself failing.
fn is_schema_error(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rig::extractor::ExtractionError>(),
        Some(rig::extractor::ExtractionError::NoData)
            | Some(rig::extractor::ExtractionError::DeserializationError(_))
    )
}

fn classify(err: anyhow::Error) -> BackendError {
    match err.downcast_ref::<rig::extractor::ExtractionError>() {
        Some(rig::extractor::ExtractionError::NoData) => {
            BackendError::Extraction("the model returned no structured data".to_string())
        }
        Some(rig::extractor::ExtractionError::DeserializationError(e)) => {
            BackendError::Extraction(e.to_string())
        }
        _ => BackendError::Transport(err),
    }
}

#[async_trait]
impl ReasoningBackend for LLMClient {
    async fn plan_next(&self, ctx: &PlanContext) -> Result<PlannerStep, BackendError> {
        self.extract::<PlannerStep>(&ctx.instructions, &ctx.render())
            .await
            .map_err(classify)
    }

    async fn extract_why_chain(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<WhyChainReport, BackendError> {
        self.extract(system_prompt, user_prompt)
            .await
            .map_err(classify)
    }

    async fn extract_ishikawa(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<IshikawaReport, BackendError> {
        self.extract(system_prompt, user_prompt)
            .await
            .map_err(classify)
    }
}
