//! Report types shared by the dialogue driver, the structured extractor and
//! the console renderer. A `Report` is created exactly once, at session end,
//! and is immutable from then on.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ishikawa categories (5M+E). `Measurement` also covers management-style
/// causes (decisions, priorities, reporting), matching the 5M+E split used by
/// the interview prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IshikawaCategory {
    Man,
    Machine,
    Material,
    Method,
    Measurement,
    Environment,
}

impl IshikawaCategory {
    /// Fixed sweep order of the six arms.
    pub const ALL: [IshikawaCategory; 6] = [
        IshikawaCategory::Man,
        IshikawaCategory::Machine,
        IshikawaCategory::Material,
        IshikawaCategory::Method,
        IshikawaCategory::Measurement,
        IshikawaCategory::Environment,
    ];

    /// What this arm is about, phrased for the interview prompts.
    pub fn focus(&self) -> &'static str {
        match self {
            IshikawaCategory::Man => "people: skills, knowledge, habits, motivation, communication",
            IshikawaCategory::Machine => "tools, equipment, software, systems, configuration",
            IshikawaCategory::Material => "raw materials, components, input data, information",
            IshikawaCategory::Method => "processes, procedures, standards, ways of working",
            IshikawaCategory::Measurement => {
                "measurement and management: metrics, monitoring, decisions, priorities"
            }
            IshikawaCategory::Environment => {
                "surroundings: physical and business conditions, culture, time pressure"
            }
        }
    }
}

impl std::fmt::Display for IshikawaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IshikawaCategory::Man => write!(f, "Man"),
            IshikawaCategory::Machine => write!(f, "Machine"),
            IshikawaCategory::Material => write!(f, "Material"),
            IshikawaCategory::Method => write!(f, "Method"),
            IshikawaCategory::Measurement => write!(f, "Measurement/Management"),
            IshikawaCategory::Environment => write!(f, "Environment"),
        }
    }
}

/// One question/answer pair of a causal "why" chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WhyStep {
    /// The "why" question that was asked.
    pub question: String,
    /// The respondent's answer, verbatim.
    pub answer: String,
}

/// A single cause attributed to one Ishikawa arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedCause {
    pub category: IshikawaCategory,
    pub text: String,
    /// Short "why" chain that led to this cause, when one was followed.
    pub chain: Option<Vec<WhyStep>>,
}

/// Causes of a finished analysis, shaped by the method that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Causes {
    /// Ordered 5-Whys chain, at most 5 steps deep.
    Chain(Vec<WhyStep>),
    /// Causes grouped by Ishikawa category.
    Categorized(Vec<CategorizedCause>),
}

impl Causes {
    pub fn len(&self) -> usize {
        match self {
            Causes::Chain(steps) => steps.len(),
            Causes::Categorized(causes) => causes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The validated result of one analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub problem_statement: String,
    pub causes: Causes,
    pub corrective_actions: Vec<String>,
    pub conclusions: Vec<String>,
    /// False when the session was aborted, cut off by the turn budget, or
    /// left topics unresolved.
    pub complete: bool,
    /// Backlog topics still open when the session ended.
    pub unresolved_topics: Vec<String>,
}

/// Extraction payload for the 5-Whys method. This is the bit-exact schema the
/// reasoning backend must satisfy; validation happens after deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WhyChainReport {
    /// 1-2 sentence statement of the analyzed problem.
    pub problem_statement: String,
    /// Ordered question/answer pairs of the "why" chain, at most 5.
    pub why_chain: Vec<WhyStep>,
    /// Concrete, realistic corrective actions.
    pub corrective_actions: Vec<String>,
    /// Key takeaways from the whole analysis.
    pub conclusions: Vec<String>,
    /// Whether the analysis reached an actionable root cause.
    pub complete: bool,
}

/// Cause strings grouped by the six fixed Ishikawa arms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CategoryCauses {
    pub man: Vec<String>,
    pub machine: Vec<String>,
    pub material: Vec<String>,
    pub method: Vec<String>,
    pub measurement: Vec<String>,
    pub environment: Vec<String>,
}

impl CategoryCauses {
    /// Flattens the mapping into `(category, cause)` pairs in sweep order.
    pub fn flatten(&self) -> Vec<(IshikawaCategory, String)> {
        let arm = |category: IshikawaCategory, causes: &[String]| {
            causes
                .iter()
                .map(|text| (category, text.clone()))
                .collect::<Vec<_>>()
        };
        let mut all = Vec::new();
        all.extend(arm(IshikawaCategory::Man, &self.man));
        all.extend(arm(IshikawaCategory::Machine, &self.machine));
        all.extend(arm(IshikawaCategory::Material, &self.material));
        all.extend(arm(IshikawaCategory::Method, &self.method));
        all.extend(arm(IshikawaCategory::Measurement, &self.measurement));
        all.extend(arm(IshikawaCategory::Environment, &self.environment));
        all
    }

    pub fn total(&self) -> usize {
        self.man.len()
            + self.machine.len()
            + self.material.len()
            + self.method.len()
            + self.measurement.len()
            + self.environment.len()
    }
}

/// Extraction payload for the Ishikawa method.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IshikawaReport {
    /// 1-2 sentence statement of the analyzed problem.
    pub problem_statement: String,
    /// Causes mapped to each of the six fixed categories.
    pub causes: CategoryCauses,
    /// Concrete, realistic corrective actions.
    pub corrective_actions: Vec<String>,
    /// Key takeaways from the whole analysis.
    pub conclusions: Vec<String>,
    /// Whether the cause map is broad enough to act on.
    pub complete: bool,
}

impl Report {
    /// `interrupted` is true when the session was aborted or cut off by the
    /// turn budget; it overrides whatever completeness the payload claims.
    pub fn from_why_chain(
        payload: WhyChainReport,
        unresolved_topics: Vec<String>,
        interrupted: bool,
    ) -> Self {
        let complete = payload.complete && unresolved_topics.is_empty() && !interrupted;
        Report {
            problem_statement: payload.problem_statement,
            causes: Causes::Chain(payload.why_chain),
            corrective_actions: payload.corrective_actions,
            conclusions: payload.conclusions,
            complete,
            unresolved_topics,
        }
    }

    pub fn from_ishikawa(
        payload: IshikawaReport,
        unresolved_topics: Vec<String>,
        interrupted: bool,
    ) -> Self {
        let complete = payload.complete && unresolved_topics.is_empty() && !interrupted;
        let causes = payload
            .causes
            .flatten()
            .into_iter()
            .map(|(category, text)| CategorizedCause {
                category,
                text,
                chain: None,
            })
            .collect();
        Report {
            problem_statement: payload.problem_statement,
            causes: Causes::Categorized(causes),
            corrective_actions: payload.corrective_actions,
            conclusions: payload.conclusions,
            complete,
            unresolved_topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_sweep_order_is_fixed() {
        assert_eq!(IshikawaCategory::ALL.len(), 6);
        assert_eq!(IshikawaCategory::ALL[0], IshikawaCategory::Man);
        assert_eq!(IshikawaCategory::ALL[5], IshikawaCategory::Environment);
    }

    #[test]
    fn test_category_causes_flatten_keeps_sweep_order() {
        let causes = CategoryCauses {
            man: vec!["no onboarding".into()],
            environment: vec!["open office noise".into()],
            ..Default::default()
        };
        let flat = causes.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].0, IshikawaCategory::Man);
        assert_eq!(flat[1].0, IshikawaCategory::Environment);
        assert_eq!(causes.total(), 2);
    }

    #[test]
    fn test_unresolved_topics_clear_the_complete_flag() {
        let payload = WhyChainReport {
            problem_statement: "builds are slow".into(),
            why_chain: vec![WhyStep {
                question: "Why are builds slow?".into(),
                answer: "No incremental caching".into(),
            }],
            corrective_actions: vec!["enable caching".into()],
            conclusions: vec!["tooling gap".into()],
            complete: true,
        };
        let report = Report::from_why_chain(payload.clone(), vec!["flaky CI runners".into()], false);
        assert!(!report.complete);
        assert_eq!(report.causes.len(), 1);

        // An interrupted session overrides a payload claiming completeness.
        let report = Report::from_why_chain(payload, vec![], true);
        assert!(!report.complete);
    }
}
