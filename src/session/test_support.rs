//! Scripted reasoning-backend double shared by the session unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::backend::{PlanContext, PlannerStep, ReasoningBackend};
use super::capability::Capability;
use super::error::BackendError;
use crate::report::{IshikawaReport, WhyChainReport, WhyStep};

/// One canned extraction outcome. `Invalid` simulates a payload the backend
/// could not shape to the schema.
pub(crate) enum ScriptedExtraction<T> {
    Valid(T),
    Invalid(String),
}

/// Replays planner steps and extraction outcomes in order. Once the planning
/// script is exhausted it keeps signaling "wrap up" so drivers always halt.
pub(crate) struct ScriptedBackend {
    steps: Mutex<VecDeque<PlannerStep>>,
    why_reports: Mutex<VecDeque<ScriptedExtraction<WhyChainReport>>>,
    ishikawa_reports: Mutex<VecDeque<ScriptedExtraction<IshikawaReport>>>,
    pub plan_calls: AtomicU32,
    pub extract_calls: AtomicU32,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<PlannerStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            why_reports: Mutex::new(VecDeque::new()),
            ishikawa_reports: Mutex::new(VecDeque::new()),
            plan_calls: AtomicU32::new(0),
            extract_calls: AtomicU32::new(0),
        }
    }

    pub fn with_why_reports(self, reports: Vec<ScriptedExtraction<WhyChainReport>>) -> Self {
        *self.why_reports.lock().unwrap() = reports.into();
        self
    }

    pub fn with_ishikawa_reports(self, reports: Vec<ScriptedExtraction<IshikawaReport>>) -> Self {
        *self.ishikawa_reports.lock().unwrap() = reports.into();
        self
    }

    pub fn ask(question: &str) -> PlannerStep {
        PlannerStep::ToolCall {
            call: Capability::AskHuman {
                question: question.to_string(),
            },
        }
    }

    pub fn say(content: &str) -> PlannerStep {
        PlannerStep::Message {
            content: content.to_string(),
        }
    }

    pub fn call(call: Capability) -> PlannerStep {
        PlannerStep::ToolCall { call }
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn plan_next(&self, _ctx: &PlanContext) -> Result<PlannerStep, BackendError> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Self::say("the cause is actionable; wrapping up")))
    }

    async fn extract_why_chain(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<WhyChainReport, BackendError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        match self.why_reports.lock().unwrap().pop_front() {
            Some(ScriptedExtraction::Valid(report)) => Ok(report),
            Some(ScriptedExtraction::Invalid(detail)) => Err(BackendError::Extraction(detail)),
            None => Err(BackendError::Extraction("no scripted report left".into())),
        }
    }

    async fn extract_ishikawa(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<IshikawaReport, BackendError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        match self.ishikawa_reports.lock().unwrap().pop_front() {
            Some(ScriptedExtraction::Valid(report)) => Ok(report),
            Some(ScriptedExtraction::Invalid(detail)) => Err(BackendError::Extraction(detail)),
            None => Err(BackendError::Extraction("no scripted report left".into())),
        }
    }
}

/// A minimal valid 5-Whys payload for tests that only care about plumbing.
pub(crate) fn valid_why_report() -> WhyChainReport {
    WhyChainReport {
        problem_statement: "Deploys keep failing on Fridays".into(),
        why_chain: vec![WhyStep {
            question: "Why do deploys fail on Fridays?".into(),
            answer: "The release train skips the staging soak".into(),
        }],
        corrective_actions: vec!["Never skip the staging soak".into()],
        conclusions: vec!["Process gap, not tooling".into()],
        complete: true,
    }
}
