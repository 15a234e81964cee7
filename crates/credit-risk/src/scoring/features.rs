use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{LoanApplication, ValidationError};

/// Version tag of the feature layout handed to a [`ProbabilityOracle`].
///
/// [`ProbabilityOracle`]: super::oracle::ProbabilityOracle
pub const FEATURE_SCHEMA_VERSION: &str = "loan-features/v1";

/// Numeric grade used by the model: A=1 through G=7, anything else 1.
pub fn grade_numeric(letter: &str) -> u8 {
    match letter.trim().to_ascii_uppercase().as_str() {
        "A" => 1,
        "B" => 2,
        "C" => 3,
        "D" => 4,
        "E" => 5,
        "F" => 6,
        "G" => 7,
        _ => 1,
    }
}

/// Secondary ratios computed from the raw application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub dti_ratio: f64,
    pub loan_percent_income: f64,
    pub income_to_loan_ratio: f64,
    pub credit_hist_to_age_ratio: f64,
    pub employment_stability: f64,
    pub loan_grade_numeric: u8,
    pub income_credit_product: f64,
    pub loan_burden: f64,
}

impl DerivedFeatures {
    /// Compute every derived ratio. Income, loan amount, and age must be
    /// strictly positive; [`LoanApplication`] guarantees it, but the check is
    /// repeated here because the ratios are meaningless otherwise.
    pub fn derive(application: &LoanApplication) -> Result<Self, ValidationError> {
        if !(application.income > 0.0) {
            return Err(ValidationError::new(
                "person_income",
                "must be greater than zero",
            ));
        }
        if !(application.loan_amount > 0.0) {
            return Err(ValidationError::new("loan_amnt", "must be greater than zero"));
        }
        if application.age == 0 {
            return Err(ValidationError::new("person_age", "must be greater than zero"));
        }

        let income = application.income;
        let loan_amount = application.loan_amount;
        let age = f64::from(application.age);

        let dti_ratio = loan_amount / income;
        let loan_grade_numeric = application.grade.numeric();

        Ok(Self {
            dti_ratio,
            loan_percent_income: dti_ratio * 100.0,
            income_to_loan_ratio: income / loan_amount,
            credit_hist_to_age_ratio: f64::from(application.credit_history_years) / age,
            employment_stability: application.employment_years / age,
            loan_grade_numeric,
            income_credit_product: income * f64::from(8 - loan_grade_numeric),
            loan_burden: (application.interest_rate * loan_amount) / income,
        })
    }

    /// First derived value that is not finite, if any.
    pub(crate) fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        [
            ("dti_ratio", self.dti_ratio),
            ("loan_percent_income", self.loan_percent_income),
            ("income_to_loan_ratio", self.income_to_loan_ratio),
            ("credit_hist_to_age_ratio", self.credit_hist_to_age_ratio),
            ("employment_stability", self.employment_stability),
            ("income_credit_product", self.income_credit_product),
            ("loan_burden", self.loan_burden),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    }
}

/// Raw and derived features in the layout named by [`FEATURE_SCHEMA_VERSION`].
///
/// `loan_grade` appears as its numeric value; the letter is not a model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    numeric: BTreeMap<&'static str, f64>,
    categorical: BTreeMap<&'static str, &'static str>,
}

impl FeatureVector {
    pub fn assemble(application: &LoanApplication, derived: &DerivedFeatures) -> Self {
        let numeric = BTreeMap::from([
            ("person_age", f64::from(application.age)),
            ("person_income", application.income),
            ("person_emp_length", application.employment_years),
            ("loan_grade", f64::from(derived.loan_grade_numeric)),
            ("loan_amnt", application.loan_amount),
            ("loan_int_rate", application.interest_rate),
            (
                "cb_person_cred_hist_length",
                f64::from(application.credit_history_years),
            ),
            ("dti_ratio", derived.dti_ratio),
            ("loan_percent_income", derived.loan_percent_income),
            ("income_to_loan_ratio", derived.income_to_loan_ratio),
            ("credit_hist_to_age_ratio", derived.credit_hist_to_age_ratio),
            ("employment_stability", derived.employment_stability),
            ("income_credit_product", derived.income_credit_product),
            ("loan_burden", derived.loan_burden),
        ]);

        let categorical = BTreeMap::from([
            ("person_home_ownership", application.home_ownership.code()),
            ("loan_intent", application.intent.code()),
            ("cb_person_default_on_file", application.prior_default.code()),
        ]);

        Self {
            numeric,
            categorical,
        }
    }

    pub fn schema_version(&self) -> &'static str {
        FEATURE_SCHEMA_VERSION
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.numeric.get(name).copied()
    }

    pub fn categorical(&self, name: &str) -> Option<&'static str> {
        self.categorical.get(name).copied()
    }

    pub fn numeric_features(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.numeric.iter().map(|(name, value)| (*name, *value))
    }

    pub fn categorical_features(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.categorical.iter().map(|(name, value)| (*name, *value))
    }
}
