//! The reasoning-backend seam. The session core only ever sees this trait;
//! the rig-backed production client lives in `crate::llm` and scripted
//! doubles live next to the tests.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::capability::Capability;
use super::error::BackendError;
use crate::report::{IshikawaReport, WhyChainReport};

/// One planning decision: invoke a capability, or speak a plain message. A
/// plain message is the method-specific advance/terminal signal. For 5-Whys
/// it means the backend judges the current cause actionable; in an Ishikawa
/// sweep it closes the current category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannerStep {
    ToolCall { call: Capability },
    Message { content: String },
}

/// Everything the backend sees when planning the next turn.
#[derive(Debug, Clone)]
pub struct PlanContext {
    /// Method- and phase-specific instructions.
    pub instructions: String,
    /// Plain-text rendering of the transcript so far.
    pub transcript: String,
    /// Rendering of the topic backlog with statuses.
    pub backlog_summary: String,
    /// Turns left before the liveness guard forces the conclusion.
    pub turns_left: u32,
}

impl PlanContext {
    /// The user-prompt side of a planning call.
    pub fn render(&self) -> String {
        format!(
            "## Conversation so far\n{}\n\n## Topic backlog\n{}\n\nTurns remaining before the session is wrapped up: {}",
            self.transcript, self.backlog_summary, self.turns_left
        )
    }
}

#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Plans the next turn given instructions, conversation state and the
    /// available capability set.
    async fn plan_next(&self, ctx: &PlanContext) -> Result<PlannerStep, BackendError>;

    /// Extracts a 5-Whys report payload from the finished conversation.
    async fn extract_why_chain(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<WhyChainReport, BackendError>;

    /// Extracts an Ishikawa report payload from the finished conversation.
    async fn extract_ishikawa(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<IshikawaReport, BackendError>;
}
