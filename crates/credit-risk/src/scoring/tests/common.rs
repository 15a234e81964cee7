use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::LoanSubmission;
use crate::scoring::engine::RiskEngine;
use crate::scoring::features::FeatureVector;
use crate::scoring::oracle::{OracleError, ProbabilityOracle};

/// The reference applicant: 30 years old, grade A, 15k against 60k income.
pub(super) fn submission() -> LoanSubmission {
    LoanSubmission {
        person_age: 30,
        person_income: 60_000.0,
        person_home_ownership: "RENT".to_string(),
        person_emp_length: 5.0,
        loan_intent: "EDUCATION".to_string(),
        loan_grade: "A".to_string(),
        loan_amnt: 15_000.0,
        loan_int_rate: 10.5,
        cb_person_default_on_file: "N".to_string(),
        cb_person_cred_hist_length: 7,
    }
}

/// A stretched applicant with a prior default and a poor grade.
pub(super) fn risky_submission() -> LoanSubmission {
    LoanSubmission {
        person_age: 24,
        person_income: 28_000.0,
        person_home_ownership: "RENT".to_string(),
        person_emp_length: 1.0,
        loan_intent: "PERSONAL".to_string(),
        loan_grade: "F".to_string(),
        loan_amnt: 14_000.0,
        loan_int_rate: 19.5,
        cb_person_default_on_file: "Y".to_string(),
        cb_person_cred_hist_length: 2,
    }
}

pub(super) struct FixedOracle {
    probability: f64,
    calls: AtomicUsize,
}

impl FixedOracle {
    pub(super) fn new(probability: f64) -> Self {
        Self {
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbabilityOracle for FixedOracle {
    fn predict(&self, _features: &FeatureVector) -> Result<f64, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

pub(super) struct UnavailableOracle;

impl ProbabilityOracle for UnavailableOracle {
    fn predict(&self, _features: &FeatureVector) -> Result<f64, OracleError> {
        Err(OracleError::Unavailable("model not loaded".to_string()))
    }
}

pub(super) struct SlowOracle;

impl ProbabilityOracle for SlowOracle {
    fn predict(&self, _features: &FeatureVector) -> Result<f64, OracleError> {
        std::thread::sleep(std::time::Duration::from_millis(300));
        Ok(0.1)
    }
}

pub(super) fn engine_with(probability: f64) -> (RiskEngine, Arc<FixedOracle>) {
    let oracle = Arc::new(FixedOracle::new(probability));
    (RiskEngine::new(oracle.clone()), oracle)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}
