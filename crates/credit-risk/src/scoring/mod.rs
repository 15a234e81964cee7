//! Risk scoring and explanation.
//!
//! A [`LoanSubmission`] is validated into a [`LoanApplication`], expanded into
//! [`DerivedFeatures`], and scored by a [`ProbabilityOracle`]. The probability
//! drives the decision and credit score; the factor tables explain it.

pub mod batch;
pub mod decision;
pub mod domain;
mod engine;
pub mod factors;
pub mod features;
pub mod oracle;
pub mod router;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchReport, BatchRow, BatchScorer, BatchSummary, RowOutcome};
pub use decision::{credit_score, decide, CreditRating, Decision, RiskLevel, DECISION_THRESHOLD};
pub use domain::{
    DefaultFlag, HomeOwnership, LoanApplication, LoanGrade, LoanIntent, LoanSubmission,
    ValidationError,
};
pub use engine::{AssessmentError, DecisionResult, QuickDecision, ResultMetadata, RiskEngine};
pub use factors::{Impact, RiskFactor, RiskFactorView};
pub use features::{grade_numeric, DerivedFeatures, FeatureVector, FEATURE_SCHEMA_VERSION};
pub use oracle::{LogisticOracle, ModelLoadError, OracleError, ProbabilityOracle};
pub use router::{assessment_router, ScoringState};
