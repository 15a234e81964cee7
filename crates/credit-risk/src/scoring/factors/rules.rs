use super::super::domain::LoanApplication;
use super::super::features::DerivedFeatures;
use super::scores::FactorScores;
use super::{Impact, RiskFactor};

/// Scores below this are weak.
pub const WEAK_BELOW: f64 = 40.0;
/// Scores at or above this are strong.
pub const STRONG_FROM: f64 = 70.0;

/// Risk dimension a rule reads its sub-score from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    DefaultHistory,
    CreditGrade,
    DebtToIncome,
    InterestRate,
    EmploymentLength,
    CreditHistory,
    Income,
    IncomeToLoan,
    EmploymentStability,
    LoanBurden,
    CreditMaturity,
}

impl Dimension {
    pub fn score(self, scores: &FactorScores) -> f64 {
        match self {
            Dimension::DefaultHistory => scores.default_score,
            Dimension::CreditGrade => scores.grade_score,
            Dimension::DebtToIncome => scores.dti_score,
            Dimension::InterestRate => scores.interest_score,
            Dimension::EmploymentLength => scores.emp_score,
            Dimension::CreditHistory => scores.credit_hist_score,
            Dimension::Income => scores.income_score,
            Dimension::IncomeToLoan => scores.income_to_loan_score,
            Dimension::EmploymentStability => scores.employment_stability_score,
            Dimension::LoanBurden => scores.loan_burden_score,
            Dimension::CreditMaturity => scores.credit_maturity_score,
        }
    }
}

/// Sub-score range a rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// `score < 40`
    Weak,
    /// `40 <= score < 70`
    Moderate,
    /// `score >= 70`
    Strong,
}

impl Band {
    pub fn of(score: f64) -> Self {
        if score < WEAK_BELOW {
            Band::Weak
        } else if score < STRONG_FROM {
            Band::Moderate
        } else {
            Band::Strong
        }
    }
}

/// Values available to a rule when it writes its note.
pub struct NoteContext<'a> {
    pub application: &'a LoanApplication,
    pub derived: &'a DerivedFeatures,
}

/// One row of the classification table.
pub struct FactorRule {
    pub dimension: Dimension,
    pub band: Band,
    pub label: &'static str,
    pub impact: Impact,
    pub importance: u8,
    pub note: fn(&NoteContext<'_>) -> String,
}

impl FactorRule {
    /// Emit this rule's factor when the dimension's score falls in its band.
    pub fn evaluate(&self, scores: &FactorScores, context: &NoteContext<'_>) -> Option<RiskFactor> {
        let score = self.dimension.score(scores);
        if Band::of(score) != self.band {
            return None;
        }

        Some(RiskFactor {
            feature: self.label.to_string(),
            impact: self.impact,
            note: (self.note)(context),
            importance: self.importance,
            percentage: score.trunc() as u8,
        })
    }
}

/// Classification table. Bands absent for a dimension emit nothing, and row
/// order is the emission order that ties keep after ranking.
pub static FACTOR_RULES: &[FactorRule] = &[
    FactorRule {
        dimension: Dimension::DefaultHistory,
        band: Band::Weak,
        label: "Previous Default History",
        impact: Impact::High,
        importance: 95,
        note: |_| "Has previous defaults on file".to_string(),
    },
    FactorRule {
        dimension: Dimension::CreditGrade,
        band: Band::Weak,
        label: "Poor Credit Grade",
        impact: Impact::High,
        importance: 90,
        note: |ctx| format!("Grade {} indicates higher risk", ctx.application.grade),
    },
    FactorRule {
        dimension: Dimension::DebtToIncome,
        band: Band::Moderate,
        label: "Moderate Debt-to-Income Ratio",
        impact: Impact::Medium,
        importance: 75,
        note: |ctx| {
            format!(
                "DTI of {:.1}% requires monitoring",
                ctx.derived.dti_ratio * 100.0
            )
        },
    },
    FactorRule {
        dimension: Dimension::DebtToIncome,
        band: Band::Weak,
        label: "High Debt-to-Income Ratio",
        impact: Impact::High,
        importance: 85,
        note: |ctx| {
            format!(
                "DTI of {:.1}% exceeds safe threshold",
                ctx.derived.dti_ratio * 100.0
            )
        },
    },
    FactorRule {
        dimension: Dimension::InterestRate,
        band: Band::Moderate,
        label: "Elevated Interest Rate",
        impact: Impact::Medium,
        importance: 70,
        note: |ctx| {
            format!(
                "Rate of {}% indicates moderate risk",
                ctx.application.interest_rate
            )
        },
    },
    FactorRule {
        dimension: Dimension::EmploymentLength,
        band: Band::Moderate,
        label: "Limited Employment History",
        impact: Impact::Medium,
        importance: 68,
        note: |ctx| format!("{} years of employment", ctx.application.employment_years),
    },
    FactorRule {
        dimension: Dimension::CreditHistory,
        band: Band::Moderate,
        label: "Developing Credit History",
        impact: Impact::Medium,
        importance: 65,
        note: |ctx| {
            format!(
                "{} years credit track record",
                ctx.application.credit_history_years
            )
        },
    },
    FactorRule {
        dimension: Dimension::DefaultHistory,
        band: Band::Strong,
        label: "Clean Repayment History",
        impact: Impact::Positive,
        importance: 88,
        note: |_| "No previous defaults recorded".to_string(),
    },
    FactorRule {
        dimension: Dimension::CreditGrade,
        band: Band::Strong,
        label: "Strong Credit Grade",
        impact: Impact::Positive,
        importance: 85,
        note: |ctx| format!("Grade {} demonstrates creditworthiness", ctx.application.grade),
    },
    FactorRule {
        dimension: Dimension::DebtToIncome,
        band: Band::Strong,
        label: "Healthy Debt-to-Income Ratio",
        impact: Impact::Positive,
        importance: 80,
        note: |ctx| {
            format!(
                "DTI of {:.1}% shows good financial management",
                ctx.derived.dti_ratio * 100.0
            )
        },
    },
    FactorRule {
        dimension: Dimension::EmploymentLength,
        band: Band::Strong,
        label: "Strong Employment Stability",
        impact: Impact::Positive,
        importance: 78,
        note: |ctx| {
            format!(
                "{} years demonstrates job security",
                ctx.application.employment_years
            )
        },
    },
    FactorRule {
        dimension: Dimension::Income,
        band: Band::Strong,
        label: "Strong Income Level",
        impact: Impact::Positive,
        importance: 82,
        note: |ctx| {
            format!(
                "Annual income of {} provides repayment capacity",
                group_thousands(ctx.application.income)
            )
        },
    },
    FactorRule {
        dimension: Dimension::CreditHistory,
        band: Band::Strong,
        label: "Established Credit History",
        impact: Impact::Positive,
        importance: 76,
        note: |ctx| {
            format!(
                "{} years of credit experience",
                ctx.application.credit_history_years
            )
        },
    },
    FactorRule {
        dimension: Dimension::IncomeToLoan,
        band: Band::Strong,
        label: "Strong Affordability Ratio",
        impact: Impact::Positive,
        importance: 84,
        note: |ctx| {
            format!(
                "Income is {:.1}x the loan amount",
                ctx.derived.income_to_loan_ratio
            )
        },
    },
    FactorRule {
        dimension: Dimension::IncomeToLoan,
        band: Band::Weak,
        label: "Loan Affordability Concern",
        impact: Impact::High,
        importance: 87,
        note: |ctx| {
            format!(
                "Loan amount is {:.1}% of annual income",
                ctx.derived.loan_percent_income
            )
        },
    },
    FactorRule {
        dimension: Dimension::EmploymentStability,
        band: Band::Strong,
        label: "Excellent Career Stability",
        impact: Impact::Positive,
        importance: 79,
        note: |ctx| {
            format!(
                "Employment spans {:.1}% of working age",
                ctx.derived.employment_stability * 100.0
            )
        },
    },
    FactorRule {
        dimension: Dimension::EmploymentStability,
        band: Band::Weak,
        label: "Limited Career Stability",
        impact: Impact::Medium,
        importance: 72,
        note: |ctx| {
            format!(
                "Short employment history relative to age ({:.1}% of age)",
                ctx.derived.employment_stability * 100.0
            )
        },
    },
    FactorRule {
        dimension: Dimension::LoanBurden,
        band: Band::Weak,
        label: "High Loan Burden",
        impact: Impact::High,
        importance: 83,
        note: |ctx| {
            format!(
                "Interest payments will significantly impact income (burden {:.2})",
                ctx.derived.loan_burden
            )
        },
    },
    FactorRule {
        dimension: Dimension::LoanBurden,
        band: Band::Strong,
        label: "Manageable Loan Burden",
        impact: Impact::Positive,
        importance: 77,
        note: |ctx| {
            format!(
                "Interest payments are sustainable relative to income (burden {:.2})",
                ctx.derived.loan_burden
            )
        },
    },
    FactorRule {
        dimension: Dimension::CreditMaturity,
        band: Band::Strong,
        label: "Mature Credit Profile",
        impact: Impact::Positive,
        importance: 74,
        note: |ctx| {
            format!(
                "Credit history covers {:.1}% of age, showing experience",
                ctx.derived.credit_hist_to_age_ratio * 100.0
            )
        },
    },
    FactorRule {
        dimension: Dimension::CreditMaturity,
        band: Band::Weak,
        label: "Young Credit Profile",
        impact: Impact::Medium,
        importance: 69,
        note: |ctx| {
            format!(
                "Credit history covers only {:.1}% of age",
                ctx.derived.credit_hist_to_age_ratio * 100.0
            )
        },
    },
];

/// Run every rule in table order and collect the factors that fire.
pub fn classify(scores: &FactorScores, context: &NoteContext<'_>) -> Vec<RiskFactor> {
    FACTOR_RULES
        .iter()
        .filter_map(|rule| rule.evaluate(scores, context))
        .collect()
}

fn group_thousands(amount: f64) -> String {
    let digits = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if amount < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(Band::of(0.0), Band::Weak);
        assert_eq!(Band::of(39.999), Band::Weak);
        assert_eq!(Band::of(40.0), Band::Moderate);
        assert_eq!(Band::of(69.999), Band::Moderate);
        assert_eq!(Band::of(70.0), Band::Strong);
        assert_eq!(Band::of(100.0), Band::Strong);
    }

    #[test]
    fn each_dimension_fires_at_most_once_per_band() {
        for (i, rule) in FACTOR_RULES.iter().enumerate() {
            for other in &FACTOR_RULES[i + 1..] {
                assert!(
                    !(rule.dimension == other.dimension && rule.band == other.band),
                    "{} and {} overlap",
                    rule.label,
                    other.label
                );
            }
        }
    }

    #[test]
    fn table_rows_match_tiers_in_emission_order() {
        use Band::{Moderate, Strong, Weak};
        use Dimension::*;

        let expected = [
            ("Previous Default History", DefaultHistory, Weak, Impact::High, 95),
            ("Poor Credit Grade", CreditGrade, Weak, Impact::High, 90),
            ("Moderate Debt-to-Income Ratio", DebtToIncome, Moderate, Impact::Medium, 75),
            ("High Debt-to-Income Ratio", DebtToIncome, Weak, Impact::High, 85),
            ("Elevated Interest Rate", InterestRate, Moderate, Impact::Medium, 70),
            ("Limited Employment History", EmploymentLength, Moderate, Impact::Medium, 68),
            ("Developing Credit History", CreditHistory, Moderate, Impact::Medium, 65),
            ("Clean Repayment History", DefaultHistory, Strong, Impact::Positive, 88),
            ("Strong Credit Grade", CreditGrade, Strong, Impact::Positive, 85),
            ("Healthy Debt-to-Income Ratio", DebtToIncome, Strong, Impact::Positive, 80),
            ("Strong Employment Stability", EmploymentLength, Strong, Impact::Positive, 78),
            ("Strong Income Level", Income, Strong, Impact::Positive, 82),
            ("Established Credit History", CreditHistory, Strong, Impact::Positive, 76),
            ("Strong Affordability Ratio", IncomeToLoan, Strong, Impact::Positive, 84),
            ("Loan Affordability Concern", IncomeToLoan, Weak, Impact::High, 87),
            ("Excellent Career Stability", EmploymentStability, Strong, Impact::Positive, 79),
            ("Limited Career Stability", EmploymentStability, Weak, Impact::Medium, 72),
            ("High Loan Burden", LoanBurden, Weak, Impact::High, 83),
            ("Manageable Loan Burden", LoanBurden, Strong, Impact::Positive, 77),
            ("Mature Credit Profile", CreditMaturity, Strong, Impact::Positive, 74),
            ("Young Credit Profile", CreditMaturity, Weak, Impact::Medium, 69),
        ];

        assert_eq!(FACTOR_RULES.len(), expected.len());
        let rows = FACTOR_RULES.iter().zip(expected);
        for (rule, (label, dimension, band, impact, importance)) in rows {
            assert_eq!(rule.label, label);
            assert_eq!(rule.dimension, dimension, "{label}");
            assert_eq!(rule.band, band, "{label}");
            assert_eq!(rule.impact, impact, "{label}");
            assert_eq!(rule.importance, importance, "{label}");
        }
    }

    fn uniform_scores(score: f64) -> FactorScores {
        FactorScores {
            default_score: score,
            grade_score: score,
            dti_score: score,
            emp_score: score,
            credit_hist_score: score,
            income_score: score,
            interest_score: score,
            age_score: score,
            income_to_loan_score: score,
            employment_stability_score: score,
            loan_burden_score: score,
            credit_maturity_score: score,
        }
    }

    fn fired(dimension: Dimension, score: f64) -> Vec<(String, u8)> {
        use crate::scoring::domain::{DefaultFlag, HomeOwnership, LoanGrade, LoanIntent};

        let application = LoanApplication {
            age: 30,
            income: 60_000.0,
            home_ownership: HomeOwnership::Rent,
            employment_years: 5.0,
            intent: LoanIntent::Education,
            grade: LoanGrade::A,
            loan_amount: 15_000.0,
            interest_rate: 10.5,
            prior_default: DefaultFlag::No,
            credit_history_years: 7,
        };
        let derived = DerivedFeatures::derive(&application).expect("derives");
        let context = NoteContext {
            application: &application,
            derived: &derived,
        };
        let scores = uniform_scores(score);

        FACTOR_RULES
            .iter()
            .filter(|rule| rule.dimension == dimension)
            .filter_map(|rule| rule.evaluate(&scores, &context))
            .map(|factor| (factor.feature, factor.percentage))
            .collect()
    }

    #[test]
    fn each_dimension_switches_tier_at_the_band_edges() {
        use Dimension::*;

        let tiers: [(Dimension, Option<&str>, Option<&str>, Option<&str>); 11] = [
            (DefaultHistory, Some("Previous Default History"), None, Some("Clean Repayment History")),
            (CreditGrade, Some("Poor Credit Grade"), None, Some("Strong Credit Grade")),
            (
                DebtToIncome,
                Some("High Debt-to-Income Ratio"),
                Some("Moderate Debt-to-Income Ratio"),
                Some("Healthy Debt-to-Income Ratio"),
            ),
            (InterestRate, None, Some("Elevated Interest Rate"), None),
            (
                EmploymentLength,
                None,
                Some("Limited Employment History"),
                Some("Strong Employment Stability"),
            ),
            (
                CreditHistory,
                None,
                Some("Developing Credit History"),
                Some("Established Credit History"),
            ),
            (Income, None, None, Some("Strong Income Level")),
            (
                IncomeToLoan,
                Some("Loan Affordability Concern"),
                None,
                Some("Strong Affordability Ratio"),
            ),
            (
                EmploymentStability,
                Some("Limited Career Stability"),
                None,
                Some("Excellent Career Stability"),
            ),
            (LoanBurden, Some("High Loan Burden"), None, Some("Manageable Loan Burden")),
            (CreditMaturity, Some("Young Credit Profile"), None, Some("Mature Credit Profile")),
        ];

        for (dimension, weak, moderate, strong) in tiers {
            let cases = [
                (39.9, weak, 39),
                (40.0, moderate, 40),
                (69.9, moderate, 69),
                (70.0, strong, 70),
            ];
            for (score, label, percentage) in cases {
                let expected: Vec<(String, u8)> = label
                    .into_iter()
                    .map(|label| (label.to_string(), percentage))
                    .collect();
                assert_eq!(
                    fired(dimension, score),
                    expected,
                    "{dimension:?} at {score}"
                );
            }
        }
    }

    #[test]
    fn one_sided_dimensions_stay_silent_in_their_gap() {
        let silent = |dimension: Dimension, band: Band| {
            !FACTOR_RULES
                .iter()
                .any(|rule| rule.dimension == dimension && rule.band == band)
        };
        assert!(silent(Dimension::DefaultHistory, Band::Moderate));
        assert!(silent(Dimension::CreditGrade, Band::Moderate));
        assert!(silent(Dimension::InterestRate, Band::Weak));
        assert!(silent(Dimension::InterestRate, Band::Strong));
        assert!(silent(Dimension::EmploymentLength, Band::Weak));
        assert!(silent(Dimension::CreditHistory, Band::Weak));
        assert!(silent(Dimension::Income, Band::Weak));
        assert!(silent(Dimension::Income, Band::Moderate));
        assert!(silent(Dimension::IncomeToLoan, Band::Moderate));
        assert!(silent(Dimension::EmploymentStability, Band::Moderate));
        assert!(silent(Dimension::LoanBurden, Band::Moderate));
        assert!(silent(Dimension::CreditMaturity, Band::Moderate));
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(950.0), "950");
        assert_eq!(group_thousands(60_000.0), "60,000");
        assert_eq!(group_thousands(1_234_567.4), "1,234,567");
    }
}
