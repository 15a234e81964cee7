use serde::{Deserialize, Serialize};

/// Probabilities strictly above this are rejected.
pub const DECISION_THRESHOLD: f64 = 0.4;

pub const MIN_CREDIT_SCORE: u16 = 300;
pub const MAX_CREDIT_SCORE: u16 = 900;

/// Binary lending outcome; there is no referral state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW RISK")]
    Low,
    #[serde(rename = "HIGH RISK")]
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW RISK",
            RiskLevel::High => "HIGH RISK",
        }
    }
}

/// Threshold the default probability into a decision and its risk level.
pub fn decide(probability: f64) -> (Decision, RiskLevel) {
    if probability > DECISION_THRESHOLD {
        (Decision::Rejected, RiskLevel::High)
    } else {
        (Decision::Approved, RiskLevel::Low)
    }
}

/// Map P(default) onto the 300-900 scale: `round(900 - p * 600)`.
pub fn credit_score(probability: f64) -> u16 {
    let raw = (900.0 - probability * 600.0).round();
    raw.clamp(f64::from(MIN_CREDIT_SCORE), f64::from(MAX_CREDIT_SCORE)) as u16
}

/// Descriptive band for a credit score, used in human-facing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditRating {
    pub fn for_score(score: u16) -> Self {
        match score {
            750.. => CreditRating::Excellent,
            650..=749 => CreditRating::Good,
            550..=649 => CreditRating::Fair,
            _ => CreditRating::Poor,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CreditRating::Excellent => "Excellent",
            CreditRating::Good => "Good",
            CreditRating::Fair => "Fair",
            CreditRating::Poor => "Poor",
        }
    }
}
