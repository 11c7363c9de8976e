#[cfg(test)]
mod tests {
    use crate::config::SessionConfig;
    use crate::report::IshikawaCategory;
    use crate::session::capability::Capability;
    use crate::session::driver::{AnalysisMethod, DialogueDriver, Phase, is_near_duplicate};
    use crate::session::mediator::ScriptedIo;
    use crate::session::test_support::ScriptedBackend;
    use std::sync::atomic::Ordering;

    fn ask(question: &str) -> crate::session::backend::PlannerStep {
        ScriptedBackend::ask(question)
    }

    fn say(content: &str) -> crate::session::backend::PlannerStep {
        ScriptedBackend::say(content)
    }

    #[tokio::test]
    async fn test_five_whys_concludes_exactly_at_depth_five() {
        let backend = ScriptedBackend::new(vec![
            ask("Why 1?"),
            ask("Why 2?"),
            ask("Why 3?"),
            ask("Why 4?"),
            ask("Why 5?"),
        ]);
        let io = ScriptedIo::new([
            "testing starts too late",
            "the schedule has no test phase",
            "estimates ignore QA",
            "planning only involves developers",
            "no process defines who plans",
        ]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("Releases ship with regressions"),
            false,
        );

        driver.run(&backend).await.unwrap();

        let outcome = driver.outcome();
        assert_eq!(driver.phase(), Phase::Done);
        assert_eq!(outcome.chain.len(), 5);
        assert!(!outcome.aborted);
        assert!(!outcome.budget_exhausted);
        // The fifth answer is where the descent stops; no sixth planning call.
        assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_chain_never_exceeds_five_despite_extra_why_turns() {
        let steps = (1..=10).map(|i| ask(&format!("Why {}?", i))).collect();
        let backend = ScriptedBackend::new(steps);
        let io = ScriptedIo::new((1..=10).map(|i| format!("distinct cause number {}", i)));
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("Build times keep growing"),
            false,
        );

        driver.run(&backend).await.unwrap();

        assert_eq!(driver.outcome().chain.len(), 5);
        assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_stagnation_guard_stops_repeating_answers() {
        let backend = ScriptedBackend::new(vec![ask("Why?"), ask("Why is that?"), ask("And why?")]);
        let io = ScriptedIo::new(["no staging environment", "no budget", "no   Budget"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("Incidents reach production unseen"),
            false,
        );

        driver.run(&backend).await.unwrap();

        // The repeated answer is recorded, then the descent ends.
        assert_eq!(driver.outcome().chain.len(), 3);
        assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stagnation_guard_looks_two_answers_back() {
        let backend = ScriptedBackend::new(vec![ask("Why?"), ask("Why b?"), ask("Why again?")]);
        let io = ScriptedIo::new(["handovers are unclear", "deadlines slip", "handovers are unclear"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("Tickets bounce between teams"),
            false,
        );

        driver.run(&backend).await.unwrap();
        assert_eq!(driver.outcome().chain.len(), 3);
        assert_eq!(driver.phase(), Phase::Done);
    }

    #[tokio::test]
    async fn test_empty_answer_ends_the_chain() {
        let backend = ScriptedBackend::new(vec![ask("Why?"), ask("Why deeper?")]);
        let io = ScriptedIo::new(["the linter is disabled", ""]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("Style regressions pile up"),
            false,
        );

        driver.run(&backend).await.unwrap();

        // The empty answer is the respondent saying "I can't go deeper".
        assert_eq!(driver.outcome().chain.len(), 1);
        assert_eq!(driver.phase(), Phase::Done);
    }

    #[tokio::test]
    async fn test_backend_message_is_the_terminal_judgment() {
        let backend = ScriptedBackend::new(vec![
            ask("Why?"),
            say("The missing runbook is directly actionable."),
        ]);
        let io = ScriptedIo::new(["there is no runbook"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("On-call pages take hours to resolve"),
            false,
        );

        driver.run(&backend).await.unwrap();

        assert_eq!(driver.outcome().chain.len(), 1);
        assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ishikawa_sweep_covers_all_categories_then_drains() {
        let config = SessionConfig {
            questions_per_category: 1,
            ..Default::default()
        };
        let backend = ScriptedBackend::new(vec![
            ask("Anything about the people involved?"),
            ScriptedBackend::call(Capability::AddTopic {
                description: "vendor lock-in".into(),
            }),
            ask("Anything about the tools?"),
            ask("Anything about the inputs?"),
            ask("Anything about the process?"),
            ask("Is this measured at all?"),
            ask("Anything about the surroundings?"),
            ask("You mentioned the vendor earlier - why is switching hard?"),
            ScriptedBackend::call(Capability::MarkAnswered {
                topic_id: 0,
                conclusion: "contract renews yearly with no exit clause".into(),
            }),
        ]);
        let io = ScriptedIo::new([
            "nobody owns the integration",
            "the sync tool silently drops rows",
            "the vendor feed arrives late",
            "there is no retry procedure",
            "no metric tracks dropped rows",
            "quarter-end load spikes",
            "the data format is proprietary",
        ]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::Ishikawa,
            config,
            io,
            Some("Nightly data sync loses records"),
            false,
        );

        driver.run(&backend).await.unwrap();

        let outcome = driver.outcome();
        let seen: std::collections::HashSet<_> =
            outcome.categorized.iter().map(|c| c.category).collect();
        assert_eq!(seen.len(), 6, "every 5M+E arm got at least one question");
        assert_eq!(outcome.categorized[0].category, IshikawaCategory::Man);
        assert!(driver.backlog().next_unanswered().is_none());
        assert_eq!(driver.phase(), Phase::Done);
        assert!(!outcome.budget_exhausted);
    }

    #[tokio::test]
    async fn test_message_cannot_close_an_unvisited_category() {
        let config = SessionConfig {
            questions_per_category: 2,
            turn_budget: 6,
            ..Default::default()
        };
        let backend = ScriptedBackend::new(vec![
            say("let's move on"),
            ask("Anything about the people involved?"),
        ]);
        let io = ScriptedIo::new(["the rota has a single name on it"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::Ishikawa,
            config,
            io,
            Some("Reviews stall for days"),
            false,
        );

        driver.run(&backend).await.unwrap();

        // The premature message did not skip Man; its question still ran.
        let outcome = driver.outcome();
        assert_eq!(outcome.categorized[0].category, IshikawaCategory::Man);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_forces_conclusion_within_one_turn() {
        let config = SessionConfig {
            turn_budget: 3,
            ..Default::default()
        };
        let steps = (1..=10).map(|i| ask(&format!("Why {}?", i))).collect();
        let backend = ScriptedBackend::new(steps);
        let io = ScriptedIo::new((1..=10).map(|i| format!("unique cause {}", i)));
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            config,
            io,
            Some("Support queue keeps growing"),
            false,
        );

        driver.run(&backend).await.unwrap();

        assert_eq!(driver.phase(), Phase::Done);
        assert!(driver.outcome().budget_exhausted);
        // No planning call happens past the budget.
        assert_eq!(driver.turns_used(), 3);
        assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_abort_keeps_what_was_collected() {
        let backend = ScriptedBackend::new(vec![ask("Why?"), ask("Why deeper?"), ask("And?")]);
        // One answer, then the respondent walks away.
        let io = ScriptedIo::new(["the backup job was never scheduled"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            Some("Restores fail in the DR drill"),
            false,
        );

        driver.run(&backend).await.unwrap();

        let outcome = driver.outcome();
        assert!(outcome.aborted);
        assert_eq!(outcome.chain.len(), 1);
        assert_eq!(driver.phase(), Phase::Done);
    }

    #[tokio::test]
    async fn test_missing_problem_statement_is_elicited_first() {
        let backend = ScriptedBackend::new(vec![
            ask("What problem do you want to analyze?"),
            ask("Why are retros useless?"),
        ]);
        let io = ScriptedIo::new(["our retros are useless", "because nobody prepares"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::FiveWhys,
            SessionConfig::default(),
            io,
            None,
            false,
        );

        driver.run(&backend).await.unwrap();

        let outcome = driver.outcome();
        assert_eq!(outcome.problem_statement, "our retros are useless");
        // The elicitation answer is not a chain step.
        assert_eq!(outcome.chain.len(), 1);
    }

    #[tokio::test]
    async fn test_off_category_threads_are_parked_not_pursued() {
        let config = SessionConfig {
            questions_per_category: 1,
            turn_budget: 4,
            ..Default::default()
        };
        let backend = ScriptedBackend::new(vec![
            ask("Anything about the people involved?"),
            ScriptedBackend::call(Capability::AddTopic {
                description: "license server outages".into(),
            }),
            ScriptedBackend::call(Capability::AddTopic {
                description: "License   Server outages".into(),
            }),
        ]);
        let io = ScriptedIo::new(["new hires get no training"]);
        let mut driver = DialogueDriver::new(
            AnalysisMethod::Ishikawa,
            config,
            io,
            Some("CAD seats are always taken"),
            false,
        );

        driver.run(&backend).await.unwrap();

        // Parked once; the normalized duplicate was a no-op.
        assert_eq!(driver.backlog().len(), 1);
    }

    #[test]
    fn test_near_duplicate_detection() {
        assert!(is_near_duplicate("No budget", "no   budget"));
        assert!(is_near_duplicate(
            "the team has no budget for testing tools",
            "the team has no budget for testing  tools"
        ));
        assert!(!is_near_duplicate("no budget", "no staging environment"));
        assert!(!is_near_duplicate("a", "b"));
    }

    #[test]
    fn test_analysis_method_parsing() {
        assert_eq!(
            "why5".parse::<AnalysisMethod>().unwrap(),
            AnalysisMethod::FiveWhys
        );
        assert_eq!(
            "ishikawa".parse::<AnalysisMethod>().unwrap(),
            AnalysisMethod::Ishikawa
        );
        assert!("fishbone".parse::<AnalysisMethod>().is_err());
        assert_eq!(AnalysisMethod::FiveWhys.to_string(), "why5");
        assert_eq!(AnalysisMethod::Ishikawa.to_string(), "ishikawa");
    }
}
