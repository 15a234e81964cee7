use crate::tool::ToolOutcome;
use chrono::{DateTime, Local};
use credit_risk::scoring::{CreditRating, Decision, DecisionResult, Impact, RiskFactorView};
use std::fmt;

const RULE_WIDTH: usize = 70;

const IMPROVEMENT_ACTIONS: [&str; 5] = [
    "Increase annual income or reduce loan amount",
    "Improve credit grade through timely bill payments",
    "Build employment stability and credit history",
    "Clear any outstanding defaults",
    "Consider adding a co-applicant with strong credit",
];

const MAINTENANCE_GUIDELINES: [&str; 5] = [
    "Maintain regular payment schedule",
    "Avoid multiple simultaneous loan applications",
    "Keep debt-to-income ratio below 40%",
    "Monitor credit report quarterly",
    "Update employment and income information",
];

/// Human-readable credit risk assessment report.
pub(crate) struct AssessmentReport<'a> {
    outcome: &'a ToolOutcome,
    generated_at: DateTime<Local>,
}

impl<'a> AssessmentReport<'a> {
    pub(crate) fn new(outcome: &'a ToolOutcome, generated_at: DateTime<Local>) -> Self {
        Self {
            outcome,
            generated_at,
        }
    }
}

impl fmt::Display for AssessmentReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        writeln!(f, "{heavy}")?;
        writeln!(f, "{:^RULE_WIDTH$}", "CREDIT RISK ASSESSMENT REPORT")?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;

        match self.outcome {
            ToolOutcome::Failure { error } => writeln!(f, "\n[ERROR] {error}")?,
            ToolOutcome::Assessment(result) => {
                predictions(f, result)?;
                rationale(f, &result.risk_factors)?;
                recommendations(f, result)?;
            }
        }

        writeln!(f, "{heavy}")?;
        writeln!(f, "{:^RULE_WIDTH$}", "End of Credit Risk Assessment Report")?;
        write!(f, "{heavy}")
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let light = "-".repeat(RULE_WIDTH);
    writeln!(f, "\n{light}")?;
    writeln!(f, "{title}")?;
    writeln!(f, "{light}")
}

fn predictions(f: &mut fmt::Formatter<'_>, result: &DecisionResult) -> fmt::Result {
    section(f, "SECTION 1: MODEL PREDICTIONS")?;

    let score = result.metadata.credit_score;
    writeln!(f, "\nProbability of Default (PD)")?;
    writeln!(f, "  Value: {:.4} (range 0.00 - 1.00)", result.probability)?;
    writeln!(f, "  Percentage: {:.2}%", result.probability * 100.0)?;

    writeln!(f, "\nCredit Score")?;
    writeln!(f, "  Score: {score}/900")?;
    writeln!(f, "  Rating: {}", CreditRating::for_score(score).label())?;

    let action = match result.decision {
        Decision::Approved => "Accept Application",
        Decision::Rejected => "Reject Application",
    };
    writeln!(f, "\nDecision Outcome")?;
    writeln!(f, "  Status: {}", result.decision.label().to_uppercase())?;
    writeln!(f, "  Action: {action}")?;
    writeln!(f, "  Risk Level: {}", result.risk_level.label())
}

fn indicator(impact: Impact) -> &'static str {
    match impact {
        Impact::High => "[HIGH RISK]",
        Impact::Medium => "[MEDIUM RISK]",
        Impact::Positive => "[POSITIVE]",
    }
}

fn rationale(f: &mut fmt::Formatter<'_>, factors: &[RiskFactorView]) -> fmt::Result {
    section(f, "SECTION 2: DECISION RATIONALE")?;

    if factors.is_empty() {
        return writeln!(f, "\nNo individual factor stood out for this application.");
    }

    writeln!(f, "\nPrimary Decision Factors")?;
    for (index, factor) in factors.iter().enumerate() {
        writeln!(f, "  {}. {}", index + 1, factor.feature)?;
        writeln!(
            f,
            "     Impact Level: {} ({}%)",
            indicator(factor.impact),
            factor.percentage
        )?;
        if !factor.note.is_empty() {
            writeln!(f, "     Details: {}", factor.note)?;
        }
    }
    writeln!(f, "Total Factors Analyzed: {}", factors.len())
}

fn recommendations(f: &mut fmt::Formatter<'_>, result: &DecisionResult) -> fmt::Result {
    section(f, "SECTION 3: RECOMMENDATIONS")?;

    match result.decision {
        Decision::Rejected => {
            writeln!(f, "\n[APPLICATION REJECTED]")?;
            writeln!(f, "\nRejection Reason Codes:")?;
            let mut adverse = result
                .risk_factors
                .iter()
                .filter(|factor| factor.impact.is_adverse())
                .peekable();
            if adverse.peek().is_none() {
                writeln!(f, "  No adverse factor in the top five")?;
            }
            for (index, factor) in adverse.enumerate() {
                writeln!(f, "  Code {}: {}", index + 1, factor.feature)?;
                writeln!(f, "          {}", factor.note)?;
            }
            bullet_list(f, "Improvement Actions:", &IMPROVEMENT_ACTIONS)
        }
        Decision::Approved => {
            writeln!(f, "\n[APPLICATION APPROVED]")?;
            let mut strengths = result
                .risk_factors
                .iter()
                .filter(|factor| factor.impact == Impact::Positive)
                .peekable();
            if strengths.peek().is_some() {
                writeln!(f, "\nApplication Strengths:")?;
                for factor in strengths {
                    writeln!(f, "  + {}", factor.feature)?;
                }
            }
            bullet_list(f, "Credit Maintenance Guidelines:", &MAINTENANCE_GUIDELINES)
        }
    }
}

fn bullet_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[&str]) -> fmt::Result {
    writeln!(f, "\n{heading}")?;
    for item in items {
        writeln!(f, "  -> {item}")?;
    }
    Ok(())
}
