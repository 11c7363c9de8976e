//! The closed capability set the planner may invoke. The driver matches on
//! the tag of this enum; there is no name-based dynamic tool dispatch.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Capability {
    /// Put exactly one question to the human respondent and wait for the
    /// verbatim answer.
    AskHuman { question: String },
    /// Park a side thread on the topic backlog for later follow-up.
    AddTopic { description: String },
    /// Close a backlog topic with its final conclusion.
    MarkAnswered { topic_id: usize, conclusion: String },
    /// Look up the earliest-raised topic that is still open.
    NextUnanswered,
    /// Review the whole backlog with per-topic statuses.
    TopicsSummary,
    /// Canned temperature probe; returns a fixed result regardless of place.
    GetTemperature { place: String },
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::AskHuman { .. } => "ask_human",
            Capability::AddTopic { .. } => "add_topic",
            Capability::MarkAnswered { .. } => "mark_topic_answered",
            Capability::NextUnanswered => "next_unanswered_topic",
            Capability::TopicsSummary => "get_topics_summary",
            Capability::GetTemperature { .. } => "get_temperature",
        }
    }
}

/// Fixed reply of the temperature probe, independent of the input. Useful as
/// a tool-roundtrip smoke check without touching any real weather service.
pub fn canned_temperature(place: &str) -> serde_json::Value {
    json!({
        "place": place,
        "temperature_c": 21.5,
        "temperature_f": 70.7,
        "conditions": "Sunny",
    })
}
