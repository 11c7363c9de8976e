//! Structured extractor: turns the finished dialogue into a validated
//! `Report`. Deserialization is the backend's job. The semantic checks and
//! the bounded correction loop around them live here.

use super::backend::ReasoningBackend;
use super::backlog::TopicBacklog;
use super::driver::{AnalysisMethod, DriverOutcome};
use super::error::{BackendError, SessionError};
use super::transcript::Transcript;
use crate::report::{IshikawaReport, Report, WhyChainReport};

const EXTRACTION_PREAMBLE: &str = "You turn a finished root-cause interview into a structured \
report. Use only what the transcript actually says: quote the respondent's causes faithfully, \
never invent answers, and keep corrective actions concrete and realistic.";

pub struct StructuredExtractor {
    /// Validation retries after the first attempt.
    retries: u32,
}

impl StructuredExtractor {
    pub fn new(retries: u32) -> Self {
        Self { retries }
    }

    /// Extracts and validates the final report. Transport failures are fatal
    /// immediately; schema and semantic failures get `retries` corrective
    /// re-asks before the session fails with `Validation`.
    pub async fn extract<B: ReasoningBackend>(
        &self,
        backend: &B,
        outcome: &DriverOutcome,
        transcript: &Transcript,
        backlog: &TopicBacklog,
    ) -> Result<Report, SessionError> {
        let unresolved: Vec<String> = backlog
            .open_topics()
            .map(|topic| topic.text.clone())
            .collect();
        let base_prompt = self.user_prompt(outcome, transcript, backlog);

        let mut prompt = base_prompt.clone();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let rejected = match self.attempt(backend, outcome, &prompt, &unresolved).await {
                Ok(report) => return Ok(report),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Rejected(detail)) => detail,
            };
            if attempts > self.retries {
                return Err(SessionError::Validation {
                    attempts,
                    detail: rejected,
                });
            }
            eprintln!("   ⚠️ report rejected, re-asking: {}", rejected);
            prompt = format!(
                "{}\n\n## Previous attempt rejected\n{}\nProduce the report again, fixing this.",
                base_prompt, rejected
            );
        }
    }

    async fn attempt<B: ReasoningBackend>(
        &self,
        backend: &B,
        outcome: &DriverOutcome,
        prompt: &str,
        unresolved: &[String],
    ) -> Result<Report, AttemptError> {
        let interrupted = outcome.aborted || outcome.budget_exhausted;
        match outcome.method {
            AnalysisMethod::FiveWhys => {
                let payload = backend
                    .extract_why_chain(EXTRACTION_PREAMBLE, prompt)
                    .await
                    .map_err(AttemptError::from)?;
                validate_why_chain(&payload, outcome.aborted).map_err(AttemptError::Rejected)?;
                Ok(Report::from_why_chain(payload, unresolved.to_vec(), interrupted))
            }
            AnalysisMethod::Ishikawa => {
                let payload = backend
                    .extract_ishikawa(EXTRACTION_PREAMBLE, prompt)
                    .await
                    .map_err(AttemptError::from)?;
                validate_ishikawa(&payload, outcome.aborted).map_err(AttemptError::Rejected)?;
                Ok(Report::from_ishikawa(payload, unresolved.to_vec(), interrupted))
            }
        }
    }

    fn user_prompt(
        &self,
        outcome: &DriverOutcome,
        transcript: &Transcript,
        backlog: &TopicBacklog,
    ) -> String {
        format!(
            "## Problem under analysis\n{}\n\n## Interview transcript\n{}\n\n## Topic backlog\n{}",
            outcome.problem_statement,
            transcript.render(),
            backlog.render_summary()
        )
    }
}

enum AttemptError {
    /// Transport failure; retrying with a corrected prompt cannot help.
    Fatal(SessionError),
    /// Schema or semantic rejection, fed back as corrective instructions.
    Rejected(String),
}

impl From<BackendError> for AttemptError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Transport(e) => AttemptError::Fatal(SessionError::Transport(e)),
            BackendError::Extraction(detail) => AttemptError::Rejected(detail),
        }
    }
}

fn validate_why_chain(payload: &WhyChainReport, aborted: bool) -> Result<(), String> {
    if payload.problem_statement.trim().is_empty() {
        return Err("problem_statement must not be empty".to_string());
    }
    if payload.why_chain.len() > 5 {
        return Err(format!(
            "why_chain has {} steps; at most 5 are allowed",
            payload.why_chain.len()
        ));
    }
    if payload.why_chain.is_empty() && !aborted {
        return Err("why_chain must contain at least one step".to_string());
    }
    if let Some(step) = payload
        .why_chain
        .iter()
        .find(|step| step.question.trim().is_empty() || step.answer.trim().is_empty())
    {
        return Err(format!(
            "why_chain contains a blank question or answer near {:?}",
            step.question
        ));
    }
    Ok(())
}

fn validate_ishikawa(payload: &IshikawaReport, aborted: bool) -> Result<(), String> {
    if payload.problem_statement.trim().is_empty() {
        return Err("problem_statement must not be empty".to_string());
    }
    if payload.causes.total() == 0 && !aborted {
        return Err("at least one cause must be attributed to a category".to_string());
    }
    if payload
        .causes
        .flatten()
        .iter()
        .any(|(_, text)| text.trim().is_empty())
    {
        return Err("cause texts must not be blank".to_string());
    }
    Ok(())
}
