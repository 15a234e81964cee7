use serde::Serialize;

use super::super::domain::{DefaultFlag, LoanApplication};
use super::super::features::DerivedFeatures;

/// Normalized 0-100 strength of each candidate risk dimension.
///
/// Higher is always better for the applicant. `age_score` is computed for
/// completeness but no classification rule reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorScores {
    pub default_score: f64,
    pub grade_score: f64,
    pub dti_score: f64,
    pub emp_score: f64,
    pub credit_hist_score: f64,
    pub income_score: f64,
    pub interest_score: f64,
    pub age_score: f64,
    pub income_to_loan_score: f64,
    pub employment_stability_score: f64,
    pub loan_burden_score: f64,
    pub credit_maturity_score: f64,
}

impl FactorScores {
    pub fn compute(application: &LoanApplication, derived: &DerivedFeatures) -> Self {
        let default_score = match application.prior_default {
            DefaultFlag::Yes => 0.0,
            DefaultFlag::No => 100.0,
        };
        let grade_numeric = f64::from(derived.loan_grade_numeric);

        Self {
            default_score,
            grade_score: clamp_score(100.0 - (grade_numeric - 1.0) * 15.0),
            dti_score: clamp_score(100.0 - derived.dti_ratio * 200.0),
            emp_score: clamp_score((application.employment_years / 10.0) * 100.0),
            credit_hist_score: clamp_score(
                (f64::from(application.credit_history_years) / 15.0) * 100.0,
            ),
            income_score: clamp_score((application.income / 150_000.0) * 100.0),
            interest_score: clamp_score(100.0 - (application.interest_rate - 5.0) * 5.0),
            age_score: clamp_score(((f64::from(application.age) - 18.0) / 42.0) * 100.0),
            income_to_loan_score: clamp_score((derived.income_to_loan_ratio / 10.0) * 100.0),
            employment_stability_score: clamp_score(
                (derived.employment_stability / 0.5) * 100.0,
            ),
            loan_burden_score: clamp_score(100.0 - derived.loan_burden * 50.0),
            credit_maturity_score: clamp_score(
                (derived.credit_hist_to_age_ratio / 0.5) * 100.0,
            ),
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
