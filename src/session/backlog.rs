//! Topic backlog: the ordered set of open/answered investigative threads one
//! session parks for later follow-up. Owned by a single session controller
//! and passed by handle, never shared across sessions.

use serde::{Deserialize, Serialize};

use super::error::BacklogError;

/// Stable identifier of a backlog topic within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicId(pub usize);

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicStatus {
    Open,
    Answered,
}

/// One investigative thread. Once answered, a topic is immutable; topics are
/// never deleted so the report assembly and the audit trail keep seeing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub text: String,
    /// Case/whitespace-normalized key used for dedup among open topics.
    normalized: String,
    pub status: TopicStatus,
    /// Insertion rank; fixes FIFO order for `next_unanswered`.
    pub rank: usize,
    pub parent: Option<TopicId>,
    pub conclusion: Option<String>,
}

/// Exact, case/whitespace-insensitive normalization. Near-duplicate detection
/// beyond this is deliberately not attempted here.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Default)]
pub struct TopicBacklog {
    topics: Vec<Topic>,
}

impl TopicBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an open topic. Adding a normalized-equal duplicate of an *open*
    /// topic is a no-op that returns the existing id; an answered topic with
    /// the same key does not block re-raising the thread.
    pub fn add(&mut self, text: &str) -> TopicId {
        self.add_with_parent(text, None)
    }

    pub fn add_with_parent(&mut self, text: &str, parent: Option<TopicId>) -> TopicId {
        let normalized = normalize(text);
        if let Some(existing) = self
            .topics
            .iter()
            .find(|t| t.status == TopicStatus::Open && t.normalized == normalized)
        {
            return existing.id;
        }

        let rank = self.topics.len();
        let id = TopicId(rank);
        self.topics.push(Topic {
            id,
            text: text.to_string(),
            normalized,
            status: TopicStatus::Open,
            rank,
            parent,
            conclusion: None,
        });
        id
    }

    /// Closes a topic with its final conclusion.
    pub fn mark_answered(&mut self, id: TopicId, conclusion: &str) -> Result<(), BacklogError> {
        let topic = self
            .topics
            .get_mut(id.0)
            .ok_or(BacklogError::UnknownTopic(id))?;
        if topic.status == TopicStatus::Answered {
            return Err(BacklogError::AlreadyAnswered(id));
        }
        topic.status = TopicStatus::Answered;
        topic.conclusion = Some(conclusion.to_string());
        Ok(())
    }

    /// The lowest-rank open topic, or `None` when everything is answered.
    pub fn next_unanswered(&self) -> Option<&Topic> {
        self.topics.iter().find(|t| t.status == TopicStatus::Open)
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(id.0)
    }

    pub fn open_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|t| t.status == TopicStatus::Open)
    }

    /// Ordered `(text, status)` view of the whole backlog.
    pub fn summary(&self) -> Vec<(String, TopicStatus)> {
        self.topics
            .iter()
            .map(|t| (t.text.clone(), t.status))
            .collect()
    }

    /// Multiline rendering handed to the planner and the extractor, one topic
    /// per line: `[id] STATUS :: text | conclusion: ...`.
    pub fn render_summary(&self) -> String {
        if self.topics.is_empty() {
            return "No topics registered yet.".to_string();
        }
        self.topics
            .iter()
            .map(|t| {
                let status = match t.status {
                    TopicStatus::Open => "OPEN",
                    TopicStatus::Answered => "ANSWERED",
                };
                match &t.conclusion {
                    Some(c) => format!("[{}] {} :: {} | conclusion: {}", t.id, status, t.text, c),
                    None => format!("[{}] {} :: {}", t.id, status, t.text),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
