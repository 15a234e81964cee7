use super::{RiskFactor, RiskFactorView};

/// Number of factors surfaced to callers.
pub const TOP_FACTORS: usize = 5;

/// Order factors by importance (ties keep emission order), keep the first
/// `limit`, and drop the importance weight.
pub fn rank(mut factors: Vec<RiskFactor>, limit: usize) -> Vec<RiskFactorView> {
    factors.sort_by(|a, b| b.importance.cmp(&a.importance));
    factors.truncate(limit);
    factors.into_iter().map(RiskFactorView::from).collect()
}
