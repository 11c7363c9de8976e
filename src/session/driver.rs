//! Dialogue driver: the per-method turn state machine. It issues questions
//! through the tool mediator, consumes answers, enforces depth/coverage/turn
//! bounds and parks side threads on the topic backlog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::backend::{PlanContext, PlannerStep, ReasoningBackend};
use super::backlog::{TopicBacklog, TopicId, normalize};
use super::capability::{Capability, canned_temperature};
use super::error::{BackendError, BacklogError, SessionError};
use super::mediator::{HumanIo, HumanReply, ToolMediator};
use super::transcript::Transcript;
use crate::config::SessionConfig;
use crate::report::{CategorizedCause, IshikawaCategory, WhyStep};

/// Root-cause analysis method driving one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisMethod {
    #[serde(rename = "why5")]
    #[default]
    FiveWhys,
    #[serde(rename = "ishikawa")]
    Ishikawa,
}

impl std::fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMethod::FiveWhys => write!(f, "why5"),
            AnalysisMethod::Ishikawa => write!(f, "ishikawa"),
        }
    }
}

impl std::str::FromStr for AnalysisMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "why5" | "5whys" | "five-whys" => Ok(AnalysisMethod::FiveWhys),
            "ishikawa" => Ok(AnalysisMethod::Ishikawa),
            _ => Err(format!("Unknown analysis method: {}", s)),
        }
    }
}

/// Driver phases. `Deepening` is the 5-Whys descent; `CategorySweep` and
/// `TopicDrain` belong to the Ishikawa variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Questioning,
    Deepening,
    CategorySweep,
    TopicDrain,
    Concluding,
    Done,
}

/// What the driver collected by the time it reached `Done`. This is the raw
/// material for the extractor and for the abort fallback report.
#[derive(Debug, Clone)]
pub struct DriverOutcome {
    pub method: AnalysisMethod,
    pub problem_statement: String,
    pub chain: Vec<WhyStep>,
    pub categorized: Vec<CategorizedCause>,
    pub aborted: bool,
    pub budget_exhausted: bool,
}

pub struct DialogueDriver<H: HumanIo> {
    method: AnalysisMethod,
    config: SessionConfig,
    mediator: ToolMediator<H>,
    transcript: Transcript,
    backlog: TopicBacklog,
    phase: Phase,
    problem_statement: String,
    /// The first answer becomes the problem statement when none was given.
    awaiting_problem: bool,
    chain: Vec<WhyStep>,
    categorized: Vec<CategorizedCause>,
    category_idx: usize,
    asked_in_category: u32,
    turns_used: u32,
    aborted: bool,
    budget_exhausted: bool,
    verbose: bool,
}

impl<H: HumanIo> DialogueDriver<H> {
    pub fn new(
        method: AnalysisMethod,
        config: SessionConfig,
        io: H,
        initial_problem: Option<&str>,
        verbose: bool,
    ) -> Self {
        let problem = initial_problem.unwrap_or("").trim().to_string();
        Self {
            method,
            config,
            mediator: ToolMediator::new(io),
            transcript: Transcript::new(),
            backlog: TopicBacklog::new(),
            phase: Phase::Init,
            awaiting_problem: problem.is_empty(),
            problem_statement: problem,
            chain: Vec::new(),
            categorized: Vec::new(),
            category_idx: 0,
            asked_in_category: 0,
            turns_used: 0,
            aborted: false,
            budget_exhausted: false,
            verbose,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn backlog(&self) -> &TopicBacklog {
        &self.backlog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turns_used(&self) -> u32 {
        self.turns_used
    }

    pub fn outcome(&self) -> DriverOutcome {
        DriverOutcome {
            method: self.method,
            problem_statement: self.problem_statement.clone(),
            chain: self.chain.clone(),
            categorized: self.categorized.clone(),
            aborted: self.aborted,
            budget_exhausted: self.budget_exhausted,
        }
    }

    /// Runs the state machine to `Done`. Exactly one question is outstanding
    /// at any time; the mediator await is the only suspension point besides
    /// the backend calls themselves.
    pub async fn run<B: ReasoningBackend>(&mut self, backend: &B) -> Result<(), SessionError> {
        loop {
            match self.phase {
                Phase::Done => return Ok(()),
                Phase::Concluding => {
                    if self.verbose {
                        println!("   ♻️ concluding after {} turns", self.turns_used);
                    }
                    self.phase = Phase::Done;
                }
                Phase::Init => {
                    if !self.awaiting_problem {
                        self.transcript.record_answer(&self.problem_statement);
                    }
                    self.phase = Phase::Questioning;
                }
                _ => {
                    // Liveness guard: an exhausted budget forces the
                    // conclusion before any further planning call.
                    if self.turns_used >= self.config.turn_budget {
                        self.budget_exhausted = true;
                        self.phase = Phase::Concluding;
                        continue;
                    }
                    let step = self.plan(backend).await?;
                    self.turns_used += 1;
                    self.apply(step).await;
                }
            }
        }
    }

    /// One planning call, with bounded repair when the backend produces a
    /// step that does not fit the closed capability set.
    async fn plan<B: ReasoningBackend>(&self, backend: &B) -> Result<PlannerStep, SessionError> {
        let base = self.plan_context();
        let mut ctx = base.clone();
        let mut attempts = 0u32;
        loop {
            match backend.plan_next(&ctx).await {
                Ok(step) => return Ok(step),
                Err(BackendError::Transport(e)) => {
                    return Err(SessionError::Transport(e));
                }
                Err(BackendError::Extraction(detail)) => {
                    attempts += 1;
                    if attempts > self.config.extraction_retries {
                        return Err(SessionError::Validation { attempts, detail });
                    }
                    eprintln!("   ⚠️ planner step rejected, asking again: {}", detail);
                    ctx = base.clone();
                    ctx.instructions = format!(
                        "{}\n\nYour previous reply was rejected: {}. Reply with exactly one valid planning step.",
                        base.instructions, detail
                    );
                }
            }
        }
    }

    async fn apply(&mut self, step: PlannerStep) {
        match step {
            PlannerStep::Message { content } => self.on_message(&content),
            PlannerStep::ToolCall { call } => match call {
                Capability::AskHuman { question } => self.ask_human(&question).await,
                other => self.invoke_capability(other),
            },
        }
    }

    async fn ask_human(&mut self, question: &str) {
        self.transcript.record_question(question);
        match self.mediator.ask(&mut self.transcript, question).await {
            HumanReply::Answer(answer) => {
                self.transcript.record_answer(&answer);
                self.on_answer(question, &answer);
            }
            HumanReply::Aborted => {
                println!("   🛑 respondent ended the session; wrapping up with what was collected");
                self.aborted = true;
                self.phase = Phase::Concluding;
            }
        }
    }

    /// Capabilities other than `ask_human` never suspend. They act on the
    /// backlog (or the canned probe) and echo the result onto the transcript.
    fn invoke_capability(&mut self, call: Capability) {
        if self.verbose {
            println!("   🔧 tool called...{}", call.name());
        }
        let (echo, result) = match &call {
            Capability::AddTopic { description } => {
                let before = self.backlog.len();
                let id = self.backlog.add(description);
                let result = if self.backlog.len() == before {
                    format!("duplicate of open topic {}; nothing added", id)
                } else {
                    format!("added topic {}", id)
                };
                (format!("add_topic({})", description), result)
            }
            Capability::MarkAnswered {
                topic_id,
                conclusion,
            } => {
                let id = TopicId(*topic_id);
                let result = match self.backlog.mark_answered(id, conclusion) {
                    Ok(()) => format!("topic {} closed", id),
                    Err(BacklogError::AlreadyAnswered(id)) => {
                        format!("noop: topic {} was already answered", id)
                    }
                    Err(BacklogError::UnknownTopic(id)) => {
                        format!("error: unknown topic id {}", id)
                    }
                };
                (format!("mark_topic_answered({}, {})", topic_id, conclusion), result)
            }
            Capability::NextUnanswered => {
                let result = match self.backlog.next_unanswered() {
                    Some(topic) => format!("[{}] {}", topic.id, topic.text),
                    None => "all topics answered".to_string(),
                };
                ("next_unanswered_topic()".to_string(), result)
            }
            Capability::TopicsSummary => (
                "get_topics_summary()".to_string(),
                self.backlog.render_summary(),
            ),
            Capability::GetTemperature { place } => (
                format!("get_temperature({})", place),
                canned_temperature(place).to_string(),
            ),
            Capability::AskHuman { .. } => unreachable!("handled by ask_human"),
        };
        self.transcript.record_tool_exchange(&echo, &result);

        // Draining ends as soon as the planner closes the last open topic.
        if self.phase == Phase::TopicDrain && self.backlog.next_unanswered().is_none() {
            self.phase = Phase::Concluding;
        }
    }

    /// A plain message is the advance/terminal signal of the current phase.
    fn on_message(&mut self, content: &str) {
        self.transcript.record_question(content);
        match (self.method, self.phase) {
            // The backend judges the cause actionable; no further "why".
            (AnalysisMethod::FiveWhys, _) => self.phase = Phase::Concluding,
            (AnalysisMethod::Ishikawa, Phase::Questioning | Phase::CategorySweep) => {
                // A category may only be closed after at least one question.
                if self.asked_in_category >= 1 {
                    self.advance_category();
                }
            }
            (AnalysisMethod::Ishikawa, _) => self.phase = Phase::Concluding,
        }
    }

    fn on_answer(&mut self, question: &str, answer: &str) {
        if self.awaiting_problem {
            self.awaiting_problem = false;
            if answer.trim().is_empty() {
                // Nothing to analyze; wrap up instead of probing a blank.
                self.phase = Phase::Concluding;
                return;
            }
            self.problem_statement = answer.trim().to_string();
            if self.method == AnalysisMethod::Ishikawa {
                self.phase = Phase::CategorySweep;
            }
            return;
        }

        match self.method {
            AnalysisMethod::FiveWhys => self.on_why_answer(question, answer),
            AnalysisMethod::Ishikawa => match self.phase {
                Phase::Questioning | Phase::CategorySweep => {
                    self.on_category_answer(question, answer)
                }
                // Drain answers feed the transcript; conclusions arrive via
                // mark_topic_answered.
                _ => {}
            },
        }
    }

    fn on_why_answer(&mut self, question: &str, answer: &str) {
        if answer.trim().is_empty() {
            // The respondent cannot go deeper; this level ends the chain.
            self.phase = Phase::Concluding;
            return;
        }

        let stagnant = self
            .chain
            .iter()
            .rev()
            .take(2)
            .any(|step| is_near_duplicate(&step.answer, answer));

        self.chain.push(WhyStep {
            question: question.to_string(),
            answer: answer.to_string(),
        });

        if stagnant || self.chain.len() >= self.config.max_chain_depth {
            self.phase = Phase::Concluding;
        } else {
            self.phase = Phase::Deepening;
        }
    }

    fn on_category_answer(&mut self, _question: &str, answer: &str) {
        self.asked_in_category += 1;
        self.phase = Phase::CategorySweep;

        if answer.trim().is_empty() {
            // Nothing in this area; move on.
            self.advance_category();
            return;
        }

        self.categorized.push(CategorizedCause {
            category: self.current_category(),
            text: answer.trim().to_string(),
            chain: None,
        });

        if self.asked_in_category >= self.config.questions_per_category {
            self.advance_category();
        }
    }

    fn current_category(&self) -> IshikawaCategory {
        IshikawaCategory::ALL[self.category_idx.min(IshikawaCategory::ALL.len() - 1)]
    }

    fn advance_category(&mut self) {
        self.category_idx += 1;
        self.asked_in_category = 0;
        if self.category_idx >= IshikawaCategory::ALL.len() {
            // Sweep complete; only now may open threads be pursued.
            self.phase = if self.backlog.next_unanswered().is_some() {
                Phase::TopicDrain
            } else {
                Phase::Concluding
            };
        }
    }

    fn plan_context(&self) -> PlanContext {
        PlanContext {
            instructions: self.instructions(),
            transcript: self.transcript.render(),
            backlog_summary: self.backlog.render_summary(),
            turns_left: self.config.turn_budget.saturating_sub(self.turns_used),
        }
    }

    fn instructions(&self) -> String {
        let base = match self.method {
            AnalysisMethod::FiveWhys => FIVE_WHYS_INSTRUCTIONS,
            AnalysisMethod::Ishikawa => ISHIKAWA_INSTRUCTIONS,
        };
        format!("{}\n\n## Current focus\n{}", base, self.phase_guidance())
    }

    fn phase_guidance(&self) -> String {
        if self.awaiting_problem {
            return "No problem statement yet. Ask the respondent what problem they want to \
                    analyze (one short question, via ask_human)."
                .to_string();
        }
        match (self.method, self.phase) {
            (AnalysisMethod::FiveWhys, _) => format!(
                "Problem under analysis: {}. Chain depth so far: {} of {}. Ask exactly one \
                 short \"why\" question going one level deeper (via ask_human). If the latest \
                 cause is already concrete and directly actionable, reply with a plain message \
                 summarizing it instead of asking again.",
                self.problem_statement,
                self.chain.len(),
                self.config.max_chain_depth
            ),
            (AnalysisMethod::Ishikawa, Phase::TopicDrain) => match self.backlog.next_unanswered() {
                Some(topic) => format!(
                    "The category sweep is finished. Work the open topic [{}] \"{}\": ask one \
                     focused question (ask_human), then close it with mark_topic_answered \
                     carrying a short conclusion. One topic at a time.",
                    topic.id, topic.text
                ),
                None => "All topics are answered. Reply with a plain message to wrap up."
                    .to_string(),
            },
            (AnalysisMethod::Ishikawa, _) => format!(
                "Problem under analysis: {}. Current area: {} ({}). Questions asked in this \
                 area: {}. Ask one short question about this area only (via ask_human). Park \
                 causes belonging to other areas with add_topic instead of pursuing them. When \
                 this area is covered, reply with a plain message to move to the next one.",
                self.problem_statement,
                self.current_category(),
                self.current_category().focus(),
                self.asked_in_category
            ),
        }
    }
}

/// Stagnation check for the 5-Whys descent: normalized-equal answers, or
/// answers sharing almost all of their words, count as the same cause.
fn is_near_duplicate(a: &str, b: &str) -> bool {
    let na = normalize(a);
    let nb = normalize(b);
    if na == nb {
        return true;
    }
    let wa: HashSet<&str> = na.split(' ').collect();
    let wb: HashSet<&str> = nb.split(' ').collect();
    let intersection = wa.intersection(&wb).count();
    let union = wa.union(&wb).count();
    union > 0 && (intersection as f64) / (union as f64) >= 0.8
}

const FIVE_WHYS_INSTRUCTIONS: &str = r#"You are an expert in the "5 Whys" root-cause technique, leading a short but probing conversation with a human respondent.

Rules of the conversation:
- Always ask exactly one short question at a time, through the ask_human capability.
- Each answer is the starting point for the next "why" question; follow the single most important causal line, never more than 5 levels deep.
- Use plain language, never repeat a question you already asked, and do not assume answers.
- If an important side thread comes up, park it with add_topic instead of chasing it; keep the backlog short.
- Stop descending once the cause is concrete, directly addressable and understood by the respondent; then reply with a plain message instead of a tool call."#;

const ISHIKAWA_INSTRUCTIONS: &str = r#"You are an expert in cause-and-effect analysis across the six 5M+E areas (Man, Machine, Material, Method, Measurement/Management, Environment), leading an orderly conversation with a human respondent.

Rules of the conversation:
- Do not reveal the method or its vocabulary to the respondent; speak simply of "areas that may influence the problem".
- Always ask exactly one short question at a time, through the ask_human capability, and never mix areas within one question.
- Work one area at a time, in the given order. Causes that belong to a different area go to the topic backlog via add_topic; work them later, one at a time, closing each with mark_topic_answered.
- Prefer a broad map of causes over a single deep chain; short "why" follow-ups inside an area are fine.
- When the current area is covered, reply with a plain message to move on."#;

// Include tests
#[cfg(test)]
mod tests;
