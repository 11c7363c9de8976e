//! Session orchestration: topic backlog, tool mediator, dialogue driver,
//! structured extractor and the controller that wires them to a reasoning
//! backend for one complete interview.

pub mod backend;
pub mod backlog;
pub mod capability;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod mediator;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{PlanContext, PlannerStep, ReasoningBackend};
pub use backlog::{Topic, TopicBacklog, TopicId, TopicStatus};
pub use capability::Capability;
pub use driver::{AnalysisMethod, DialogueDriver, DriverOutcome, Phase};
pub use error::{BackendError, BacklogError, SessionError};
pub use extractor::StructuredExtractor;
pub use mediator::{ConsoleIo, HumanIo, HumanReply, ScriptedIo, ToolMediator};
pub use transcript::{Transcript, Turn, TurnRole};

use crate::config::{Config, SessionConfig};
use crate::report::{Causes, Report};

/// Runs one analysis session end to end: dialogue first, extraction second.
/// A controller is built per session and consumed by `run`.
pub struct SessionController<H: HumanIo> {
    method: AnalysisMethod,
    config: SessionConfig,
    io: H,
    problem: Option<String>,
    verbose: bool,
}

impl<H: HumanIo> SessionController<H> {
    pub fn new(
        method: AnalysisMethod,
        config: SessionConfig,
        io: H,
        problem: Option<String>,
        verbose: bool,
    ) -> Self {
        Self {
            method,
            config,
            io,
            problem,
            verbose,
        }
    }

    pub async fn run<B: ReasoningBackend>(self, backend: &B) -> Result<Report, SessionError> {
        let mut driver = DialogueDriver::new(
            self.method,
            self.config.clone(),
            self.io,
            self.problem.as_deref(),
            self.verbose,
        );
        driver.run(backend).await?;

        let outcome = driver.outcome();
        let extractor = StructuredExtractor::new(self.config.extraction_retries);
        match extractor
            .extract(backend, &outcome, driver.transcript(), driver.backlog())
            .await
        {
            Ok(report) => Ok(report),
            // An aborted interview still owes the user whatever was
            // collected, even when the backend cannot shape it anymore.
            Err(e) if outcome.aborted => {
                eprintln!("   ⚠️ extraction failed after abort, reporting raw findings: {}", e);
                Ok(fallback_report(&outcome, driver.backlog()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Best-effort report assembled straight from the driver's state, used when
/// an aborted session cannot be extracted. Always marked incomplete.
fn fallback_report(outcome: &DriverOutcome, backlog: &TopicBacklog) -> Report {
    let causes = match outcome.method {
        AnalysisMethod::FiveWhys => Causes::Chain(outcome.chain.clone()),
        AnalysisMethod::Ishikawa => Causes::Categorized(outcome.categorized.clone()),
    };
    Report {
        problem_statement: outcome.problem_statement.clone(),
        causes,
        corrective_actions: Vec::new(),
        conclusions: vec!["Session ended before the analysis was finished.".to_string()],
        complete: false,
        unresolved_topics: backlog
            .open_topics()
            .map(|topic| topic.text.clone())
            .collect(),
    }
}

/// Launches an interactive console session from the resolved configuration.
pub async fn launch(config: &Config) -> anyhow::Result<()> {
    println!("🔍 Root-cause analysis: {} method", config.method);

    let client = crate::llm::client::LLMClient::new(config.llm.clone())?;
    client.check_connection().await?;

    let controller = SessionController::new(
        config.method,
        config.session.clone(),
        ConsoleIo,
        config.problem.clone(),
        config.verbose,
    );
    let report = controller.run(&client).await?;

    println!("{}", crate::render::render(&report));
    Ok(())
}
