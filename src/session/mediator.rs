//! Tool mediator: the session's single suspension point. The conversation is
//! strictly alternating, so asking blocks the whole session until a human
//! answer arrives, then appends the tool-call/tool-result turn pair.

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;

use super::transcript::Transcript;

/// Outcome of one suspension. Answers are verbatim, empty strings included;
/// interpreting emptiness is the driver's job, not the mediator's.
#[derive(Debug, Clone, PartialEq)]
pub enum HumanReply {
    Answer(String),
    Aborted,
}

/// The human side of the dialogue. Implementations can be a console, a
/// networked UI, or a scripted replay. The driver never knows which.
#[async_trait]
pub trait HumanIo: Send {
    async fn ask(&mut self, prompt: &str) -> HumanReply;
}

/// Console front end: prompt to stdout, answer from stdin. EOF aborts.
#[derive(Debug, Default)]
pub struct ConsoleIo;

#[async_trait]
impl HumanIo for ConsoleIo {
    async fn ask(&mut self, prompt: &str) -> HumanReply {
        println!("\n🤔 Agent asks: {}", prompt);
        print!("👤 Your answer: ");
        let _ = std::io::stdout().flush();

        // stdin reads are blocking; keep them off the async runtime thread.
        let line = tokio::task::spawn_blocking(|| {
            let mut buf = String::new();
            match std::io::stdin().read_line(&mut buf) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(buf),
            }
        })
        .await
        .unwrap_or(None);

        match line {
            Some(raw) => HumanReply::Answer(
                raw.strip_suffix('\n')
                    .map(|s| s.strip_suffix('\r').unwrap_or(s))
                    .unwrap_or(&raw)
                    .to_string(),
            ),
            None => HumanReply::Aborted,
        }
    }
}

/// Replay front end with canned answers, for scripted runs and tests. An
/// exhausted script counts as the human walking away.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    answers: VecDeque<String>,
}

impl ScriptedIo {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl HumanIo for ScriptedIo {
    async fn ask(&mut self, _prompt: &str) -> HumanReply {
        match self.answers.pop_front() {
            Some(answer) => HumanReply::Answer(answer),
            None => HumanReply::Aborted,
        }
    }
}

/// Suspends the driver for one human answer per call and records the
/// exchange on the transcript.
pub struct ToolMediator<H: HumanIo> {
    io: H,
}

impl<H: HumanIo> ToolMediator<H> {
    pub fn new(io: H) -> Self {
        Self { io }
    }

    pub async fn ask(&mut self, transcript: &mut Transcript, question: &str) -> HumanReply {
        let reply = self.io.ask(question).await;
        let result = match &reply {
            HumanReply::Answer(answer) => answer.clone(),
            HumanReply::Aborted => "<session aborted by the respondent>".to_string(),
        };
        transcript.record_tool_exchange(&format!("ask_human({})", question), &result);
        reply
    }
}
