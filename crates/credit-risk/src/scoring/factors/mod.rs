//! Heuristic risk factors that explain a decision independently of the model.
//!
//! [`FactorScores`] normalizes each dimension to 0-100, the [`rules`] table
//! turns scores into tiered factors, and [`rank`] picks what callers see.

mod ranking;
pub mod rules;
mod scores;

pub use ranking::{rank, TOP_FACTORS};
pub use rules::{classify, Band, Dimension, FactorRule, NoteContext, FACTOR_RULES};
pub use scores::FactorScores;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    High,
    Medium,
    Positive,
}

impl Impact {
    pub const fn label(self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Medium => "MEDIUM",
            Impact::Positive => "POSITIVE",
        }
    }

    /// HIGH and MEDIUM factors count against the applicant.
    pub const fn is_adverse(self) -> bool {
        matches!(self, Impact::High | Impact::Medium)
    }
}

/// Classified factor, including the weight used only for ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskFactor {
    pub feature: String,
    pub impact: Impact,
    pub note: String,
    pub importance: u8,
    pub percentage: u8,
}

/// Factor as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorView {
    pub feature: String,
    pub impact: Impact,
    pub note: String,
    pub percentage: u8,
}

impl From<RiskFactor> for RiskFactorView {
    fn from(factor: RiskFactor) -> Self {
        Self {
            feature: factor.feature,
            impact: factor.impact,
            note: factor.note,
            percentage: factor.percentage,
        }
    }
}
