//! Transcript: the ordered record of all turns in one session. Sequence
//! numbers are strictly increasing, and tool-call/tool-result turns are only
//! ever appended as an adjacent pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRole {
    AgentQuestion,
    HumanAnswer,
    ToolCall,
    ToolResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub seq: u64,
    pub role: TurnRole,
    pub payload: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_seq: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, role: TurnRole, payload: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.turns.push(Turn {
            seq,
            role,
            payload: payload.to_string(),
            at: Utc::now(),
        });
    }

    pub fn record_question(&mut self, question: &str) {
        self.push(TurnRole::AgentQuestion, question);
    }

    pub fn record_answer(&mut self, answer: &str) {
        self.push(TurnRole::HumanAnswer, answer);
    }

    /// Appends a tool-call turn and its tool-result turn as one unit, so no
    /// other turn can ever sit between them.
    pub fn record_tool_exchange(&mut self, call: &str, result: &str) {
        self.push(TurnRole::ToolCall, call);
        self.push(TurnRole::ToolResult, result);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Plain-text rendering handed to the reasoning backend.
    pub fn render(&self) -> String {
        if self.turns.is_empty() {
            return "(no turns yet)".to_string();
        }
        self.turns
            .iter()
            .map(|turn| {
                let prefix = match turn.role {
                    TurnRole::AgentQuestion => "Agent",
                    TurnRole::HumanAnswer => "Human",
                    TurnRole::ToolCall => "[tool-call]",
                    TurnRole::ToolResult => "[tool-result]",
                };
                format!("{}: {}", prefix, turn.payload)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
