//! Session error taxonomy. Only exhausted transport or validation retries are
//! fatal; budget overruns and user aborts degrade to a partial report and
//! never surface here.

use thiserror::Error;

use super::backlog::TopicId;

/// Backlog operation failures. `AlreadyAnswered` is informational: the driver
/// echoes it back to the planner instead of failing the session.
#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("unknown topic id {0}")]
    UnknownTopic(TopicId),
    #[error("topic {0} is already answered")]
    AlreadyAnswered(TopicId),
}

/// Failures reported by the reasoning backend. Transport failures have
/// already been retried by the client when they reach the session layer;
/// extraction failures feed the bounded validation-retry loop instead.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("reasoning backend transport failure: {0}")]
    Transport(anyhow::Error),
    #[error("structured extraction failed: {0}")]
    Extraction(String),
}

/// The terminating cause carried out of `SessionController::run`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("reasoning backend unreachable after retries: {0}")]
    Transport(anyhow::Error),
    #[error("report failed schema validation after {attempts} attempts: {detail}")]
    Validation { attempts: u32, detail: String },
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Transport(e) => SessionError::Transport(e),
            BackendError::Extraction(detail) => SessionError::Validation {
                attempts: 1,
                detail,
            },
        }
    }
}
