//! Console rendering of the final report.

use crate::report::{Causes, Report};

const RULE: &str =
    "══════════════════════════════════════════════════════════════════════";

/// Renders the report as a framed console summary.
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", RULE));
    out.push_str("📋 ROOT-CAUSE ANALYSIS REPORT\n");
    out.push_str(&format!("{}\n", RULE));

    out.push_str(&format!("\n❓ Problem\n   {}\n", report.problem_statement));

    match &report.causes {
        Causes::Chain(steps) => {
            out.push_str("\n🔗 Why chain\n");
            for (depth, step) in steps.iter().enumerate() {
                out.push_str(&format!("   {}. {}\n", depth + 1, step.question));
                out.push_str(&format!("      → {}\n", step.answer));
            }
            if let Some(root) = steps.last() {
                out.push_str(&format!("\n🎯 Root cause\n   {}\n", root.answer));
            }
        }
        Causes::Categorized(causes) => {
            out.push_str("\n🐟 Causes by category\n");
            let mut current = None;
            for cause in causes {
                if current != Some(cause.category) {
                    current = Some(cause.category);
                    out.push_str(&format!("   [{}]\n", cause.category));
                }
                out.push_str(&format!("     • {}\n", cause.text));
            }
        }
    }

    if !report.corrective_actions.is_empty() {
        out.push_str("\n🛠  Corrective actions\n");
        for action in &report.corrective_actions {
            out.push_str(&format!("   • {}\n", action));
        }
    }

    if !report.conclusions.is_empty() {
        out.push_str("\n💡 Conclusions\n");
        for conclusion in &report.conclusions {
            out.push_str(&format!("   • {}\n", conclusion));
        }
    }

    if !report.unresolved_topics.is_empty() {
        out.push_str("\n📌 Unresolved topics\n");
        for topic in &report.unresolved_topics {
            out.push_str(&format!("   • {}\n", topic));
        }
    }

    let status = if report.complete {
        "✅ Analysis complete"
    } else {
        "⚠️ Analysis incomplete"
    };
    out.push_str(&format!("\n{}\n{}\n", status, RULE));

    out
}
