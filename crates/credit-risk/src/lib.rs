//! Loan default risk scoring.
//!
//! The [`scoring`] module owns the decision logic: feature derivation, the
//! probability oracle seam, decisioning, and the explanatory risk factors.
//! Everything else here is the application shell shared with the API service.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
