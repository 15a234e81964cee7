use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::features::{FeatureVector, FEATURE_SCHEMA_VERSION};

/// Black-box default classifier: maps a feature vector to P(default).
///
/// Implementations are loaded once and shared read-only across requests, so
/// `predict` takes `&self` and must not mutate the model.
pub trait ProbabilityOracle: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, OracleError>;
}

/// Failure raised by an oracle during inference.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    #[error("probability oracle unavailable: {0}")]
    Unavailable(String),
    #[error("model expects feature '{0}' which the request did not provide")]
    MissingFeature(String),
    #[error("feature schema mismatch (model {model}, request {request})")]
    SchemaMismatch { model: String, request: String },
    #[error("oracle returned an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Failure reading a model artifact at startup.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact targets feature schema '{found}', expected '{expected}'")]
    SchemaMismatch { expected: String, found: String },
    #[error("feature '{feature}' has a non-positive or non-finite scale")]
    InvalidScale { feature: String },
}

#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    schema_version: String,
    #[serde(default)]
    model_version: Option<String>,
    intercept: f64,
    numeric: BTreeMap<String, NumericTerm>,
    #[serde(default)]
    categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct NumericTerm {
    weight: f64,
    #[serde(default)]
    mean: f64,
    #[serde(default = "unit_scale")]
    scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// Standardized logistic regression read from a JSON artifact.
///
/// Numeric inputs are standardized with the stored mean and scale; categorical
/// inputs contribute the weight of their one-hot column, and unseen categories
/// contribute nothing.
#[derive(Debug, Clone)]
pub struct LogisticOracle {
    model_version: Option<String>,
    intercept: f64,
    numeric: BTreeMap<String, NumericTerm>,
    categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LogisticOracle {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;

        if artifact.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(ModelLoadError::SchemaMismatch {
                expected: FEATURE_SCHEMA_VERSION.to_string(),
                found: artifact.schema_version,
            });
        }

        if let Some((feature, _)) = artifact
            .numeric
            .iter()
            .find(|(_, term)| !(term.scale.is_finite() && term.scale > 0.0))
        {
            return Err(ModelLoadError::InvalidScale {
                feature: feature.clone(),
            });
        }

        Ok(Self {
            model_version: artifact.model_version,
            intercept: artifact.intercept,
            numeric: artifact.numeric,
            categorical: artifact.categorical,
        })
    }

    pub fn model_version(&self) -> Option<&str> {
        self.model_version.as_deref()
    }

    fn logit(&self, features: &FeatureVector) -> Result<f64, OracleError> {
        let mut z = self.intercept;

        for (name, term) in &self.numeric {
            let value = features
                .numeric(name)
                .ok_or_else(|| OracleError::MissingFeature(name.clone()))?;
            z += term.weight * (value - term.mean) / term.scale;
        }

        for (name, weights) in &self.categorical {
            let category = features
                .categorical(name)
                .ok_or_else(|| OracleError::MissingFeature(name.clone()))?;
            z += weights.get(category).copied().unwrap_or(0.0);
        }

        Ok(z)
    }
}

impl ProbabilityOracle for LogisticOracle {
    fn predict(&self, features: &FeatureVector) -> Result<f64, OracleError> {
        if features.schema_version() != FEATURE_SCHEMA_VERSION {
            return Err(OracleError::SchemaMismatch {
                model: FEATURE_SCHEMA_VERSION.to_string(),
                request: features.schema_version().to_string(),
            });
        }

        let z = self.logit(features)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::{
        DefaultFlag, HomeOwnership, LoanApplication, LoanGrade, LoanIntent,
    };
    use crate::scoring::features::DerivedFeatures;

    fn features() -> FeatureVector {
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
        FeatureVector::assemble(&application, &derived)
    }

    #[test]
    fn zero_logit_yields_even_odds() {
        let artifact = r#"{
            "schema_version": "loan-features/v1",
            "intercept": 0.0,
            "numeric": { "dti_ratio": { "weight": 2.0, "mean": 0.25, "scale": 0.1 } }
        }"#;
        let oracle = LogisticOracle::from_reader(artifact.as_bytes()).expect("loads");
        let p = oracle.predict(&features()).expect("predicts");
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn categorical_weights_shift_probability() {
        let artifact = r#"{
            "schema_version": "loan-features/v1",
            "model_version": "test",
            "intercept": 0.0,
            "numeric": {},
            "categorical": { "person_home_ownership": { "RENT": 1.0, "OWN": -1.0 } }
        }"#;
        let oracle = LogisticOracle::from_reader(artifact.as_bytes()).expect("loads");
        let p = oracle.predict(&features()).expect("predicts");
        assert!(p > 0.5);
        assert_eq!(oracle.model_version(), Some("test"));
    }

    #[test]
    fn missing_feature_is_an_oracle_failure() {
        let artifact = r#"{
            "schema_version": "loan-features/v1",
            "intercept": 0.0,
            "numeric": { "months_since_last_delinquency": { "weight": 1.0 } }
        }"#;
        let oracle = LogisticOracle::from_reader(artifact.as_bytes()).expect("loads");
        let err = oracle.predict(&features()).expect_err("feature missing");
        assert_eq!(
            err,
            OracleError::MissingFeature("months_since_last_delinquency".to_string())
        );
    }

    #[test]
    fn rejects_foreign_schema_version() {
        let artifact = r#"{ "schema_version": "loan-features/v0", "intercept": 0.0, "numeric": {} }"#;
        let err = LogisticOracle::from_reader(artifact.as_bytes()).expect_err("old schema");
        assert!(matches!(err, ModelLoadError::SchemaMismatch { .. }));
    }

    #[test]
    fn rejects_zero_scale() {
        let artifact = r#"{
            "schema_version": "loan-features/v1",
            "intercept": 0.0,
            "numeric": { "loan_amnt": { "weight": 1.0, "scale": 0.0 } }
        }"#;
        let err = LogisticOracle::from_reader(artifact.as_bytes()).expect_err("zero scale");
        assert!(matches!(err, ModelLoadError::InvalidScale { feature } if feature == "loan_amnt"));
    }

    #[test]
    fn bundled_model_loads_and_predicts() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/credit_risk_model.json");
        let oracle = LogisticOracle::from_path(path).expect("bundled model loads");
        let p = oracle.predict(&features()).expect("predicts");
        assert!((0.0..=1.0).contains(&p));
    }
}
