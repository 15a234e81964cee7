use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::decision::{credit_score, decide, Decision, RiskLevel};
use super::domain::{LoanApplication, LoanGrade, LoanSubmission, ValidationError};
use super::factors::{classify, rank, FactorScores, NoteContext, RiskFactorView, TOP_FACTORS};
use super::features::{DerivedFeatures, FeatureVector};
use super::oracle::{OracleError, ProbabilityOracle};

/// Oracle output may drift this far outside [0, 1] before it is refused.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Request-independent scoring context: the loaded oracle, shared read-only.
///
/// Construct once at startup and hand out clones (or an `Arc`) to callers;
/// every assessment is a pure function of the submission and this context.
#[derive(Clone)]
pub struct RiskEngine {
    oracle: Arc<dyn ProbabilityOracle>,
}

impl RiskEngine {
    pub fn new(oracle: Arc<dyn ProbabilityOracle>) -> Self {
        Self { oracle }
    }

    /// Validate, score, and explain one submission.
    pub fn assess(&self, submission: LoanSubmission) -> Result<DecisionResult, AssessmentError> {
        let application = LoanApplication::try_from(submission).inspect_err(|err| {
            warn!(field = err.field, reason = %err.reason, "rejected loan submission");
        })?;
        self.assess_application(&application)
    }

    pub fn assess_application(
        &self,
        application: &LoanApplication,
    ) -> Result<DecisionResult, AssessmentError> {
        let (derived, features) = prepare(application)?;
        let probability = self.probability(&features)?;

        let (decision, risk_level) = decide(probability);
        let credit_score = credit_score(probability);

        let scores = FactorScores::compute(application, &derived);
        let context = NoteContext {
            application,
            derived: &derived,
        };
        let emitted = classify(&scores, &context);
        debug!(emitted = emitted.len(), ?scores, "classified risk factors");
        let risk_factors = rank(emitted, TOP_FACTORS);

        info!(
            probability,
            decision = decision.label(),
            credit_score,
            "loan application assessed"
        );

        Ok(DecisionResult {
            probability,
            decision,
            risk_level,
            risk_factors,
            metadata: ResultMetadata {
                credit_score,
                dti_ratio: derived.dti_ratio,
                loan_grade: application.grade,
                income: application.income,
                employment_years: application.employment_years,
            },
        })
    }

    /// Probability and decision only, without factor analysis.
    pub fn quick_decision(
        &self,
        submission: LoanSubmission,
    ) -> Result<QuickDecision, AssessmentError> {
        let application = LoanApplication::try_from(submission)?;
        let (_, features) = prepare(&application)?;
        let probability = self.probability(&features)?;
        let (decision, _) = decide(probability);

        Ok(QuickDecision {
            probability_of_default: probability,
            decision,
        })
    }

    fn probability(&self, features: &FeatureVector) -> Result<f64, AssessmentError> {
        let raw = self.oracle.predict(features).inspect_err(|err| {
            error!(error = %err, "probability oracle failed");
        })?;

        let probability = checked_probability(raw).inspect_err(|err| {
            error!(error = %err, "probability oracle returned an unusable value");
        })?;
        debug!(raw, probability, "oracle probability");
        Ok(probability)
    }
}

fn prepare(application: &LoanApplication) -> Result<(DerivedFeatures, FeatureVector), AssessmentError> {
    let derived = DerivedFeatures::derive(application)?;

    if let Some((name, value)) = derived.first_non_finite() {
        error!(feature = name, value, ?application, "derived feature is not finite");
        return Err(AssessmentError::Internal(format!(
            "derived feature {name} is not finite"
        )));
    }

    debug!(?derived, "derived features");
    let features = FeatureVector::assemble(application, &derived);
    Ok((derived, features))
}

fn checked_probability(raw: f64) -> Result<f64, OracleError> {
    if !raw.is_finite()
        || raw < -PROBABILITY_TOLERANCE
        || raw > 1.0 + PROBABILITY_TOLERANCE
    {
        return Err(OracleError::InvalidProbability(raw));
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// Why an assessment produced no result.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("assessment exceeded {0} ms")]
    Timeout(u128),
    #[error("internal scoring error: {0}")]
    Internal(String),
}

/// Full response: decision, score, and the explanatory factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub probability: f64,
    pub decision: Decision,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactorView>,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub credit_score: u16,
    pub dti_ratio: f64,
    pub loan_grade: LoanGrade,
    pub income: f64,
    pub employment_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickDecision {
    pub probability_of_default: f64,
    pub decision: Decision,
}
