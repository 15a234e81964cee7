use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::grade_numeric;

/// Loan application exactly as it arrives on the wire.
///
/// Categorical fields stay as strings here so that an unknown value is reported
/// as a [`ValidationError`] naming the field instead of a generic decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSubmission {
    pub person_age: i32,
    pub person_income: f64,
    pub person_home_ownership: String,
    pub person_emp_length: f64,
    pub loan_intent: String,
    pub loan_grade: String,
    pub loan_amnt: f64,
    pub loan_int_rate: f64,
    pub cb_person_default_on_file: String,
    pub cb_person_cred_hist_length: i32,
}

impl LoanSubmission {
    /// Canonical spelling of the categorical fields: trimmed, upper-case, and
    /// for loan intent with inner spaces removed ("debt consolidation").
    pub fn normalized(mut self) -> Self {
        self.person_home_ownership = self.person_home_ownership.trim().to_ascii_uppercase();
        self.loan_intent = self
            .loan_intent
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        self.loan_grade = self.loan_grade.trim().to_ascii_uppercase();
        self.cb_person_default_on_file =
            self.cb_person_default_on_file.trim().to_ascii_uppercase();
        self
    }
}

/// Validated, immutable loan application consumed by the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanApplication {
    pub age: u32,
    pub income: f64,
    pub home_ownership: HomeOwnership,
    pub employment_years: f64,
    pub intent: LoanIntent,
    pub grade: LoanGrade,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub prior_default: DefaultFlag,
    pub credit_history_years: u32,
}

impl TryFrom<LoanSubmission> for LoanApplication {
    type Error = ValidationError;

    fn try_from(submission: LoanSubmission) -> Result<Self, Self::Error> {
        let submission = submission.normalized();

        let age = positive_integer("person_age", submission.person_age)?;
        let income = positive_amount("person_income", submission.person_income)?;
        let home_ownership = HomeOwnership::parse(&submission.person_home_ownership)?;
        let employment_years =
            non_negative_amount("person_emp_length", submission.person_emp_length)?;
        let intent = LoanIntent::parse(&submission.loan_intent)?;
        let grade = LoanGrade::parse(&submission.loan_grade)?;
        let loan_amount = positive_amount("loan_amnt", submission.loan_amnt)?;
        let interest_rate = non_negative_amount("loan_int_rate", submission.loan_int_rate)?;
        let prior_default = DefaultFlag::parse(&submission.cb_person_default_on_file)?;
        let credit_history_years = u32::try_from(submission.cb_person_cred_hist_length)
            .map_err(|_| ValidationError::new("cb_person_cred_hist_length", "must not be negative"))?;

        Ok(Self {
            age,
            income,
            home_ownership,
            employment_years,
            intent,
            grade,
            loan_amount,
            interest_rate,
            prior_default,
            credit_history_years,
        })
    }
}

fn positive_integer(field: &'static str, value: i32) -> Result<u32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(
            field,
            format!("must be greater than zero (got {value})"),
        ));
    }
    Ok(value as u32)
}

fn positive_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be a finite amount greater than zero (got {value})"),
        ));
    }
    Ok(value)
}

fn non_negative_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be a finite, non-negative value (got {value})"),
        ));
    }
    Ok(value)
}

/// Malformed or out-of-domain input, detected before any scoring work.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    fn unrecognized(field: &'static str, value: &str, expected: &str) -> Self {
        Self::new(
            field,
            format!("unrecognized value '{value}', expected one of {expected}"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Rent,
    Own,
    Mortgage,
    Other,
}

impl HomeOwnership {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "RENT" => Ok(Self::Rent),
            "OWN" => Ok(Self::Own),
            "MORTGAGE" => Ok(Self::Mortgage),
            "OTHER" => Ok(Self::Other),
            other => Err(ValidationError::unrecognized(
                "person_home_ownership",
                other,
                "RENT, OWN, MORTGAGE, OTHER",
            )),
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Rent => "RENT",
            Self::Own => "OWN",
            Self::Mortgage => "MORTGAGE",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanIntent {
    Education,
    Medical,
    Venture,
    Personal,
    DebtConsolidation,
    HomeImprovement,
}

impl LoanIntent {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "EDUCATION" => Ok(Self::Education),
            "MEDICAL" => Ok(Self::Medical),
            "VENTURE" => Ok(Self::Venture),
            "PERSONAL" => Ok(Self::Personal),
            "DEBTCONSOLIDATION" => Ok(Self::DebtConsolidation),
            "HOMEIMPROVEMENT" => Ok(Self::HomeImprovement),
            other => Err(ValidationError::unrecognized(
                "loan_intent",
                other,
                "EDUCATION, MEDICAL, VENTURE, PERSONAL, DEBTCONSOLIDATION, HOMEIMPROVEMENT",
            )),
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Education => "EDUCATION",
            Self::Medical => "MEDICAL",
            Self::Venture => "VENTURE",
            Self::Personal => "PERSONAL",
            Self::DebtConsolidation => "DEBTCONSOLIDATION",
            Self::HomeImprovement => "HOMEIMPROVEMENT",
        }
    }
}

/// Lender-assigned loan grade, A (best) through G.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl LoanGrade {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            "F" => Ok(Self::F),
            "G" => Ok(Self::G),
            other => Err(ValidationError::unrecognized(
                "loan_grade",
                other,
                "A, B, C, D, E, F, G",
            )),
        }
    }

    pub const fn letter(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
        }
    }

    /// Model input for this grade, A=1 through G=7.
    pub fn numeric(self) -> u8 {
        grade_numeric(self.letter())
    }
}

impl fmt::Display for LoanGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Whether the credit bureau has a prior default on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultFlag {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

impl DefaultFlag {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "Y" => Ok(Self::Yes),
            "N" => Ok(Self::No),
            other => Err(ValidationError::unrecognized(
                "cb_person_default_on_file",
                other,
                "Y, N",
            )),
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Yes => "Y",
            Self::No => "N",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> LoanSubmission {
        LoanSubmission {
            person_age: 30,
            person_income: 60_000.0,
            person_home_ownership: "rent".to_string(),
            person_emp_length: 5.0,
            loan_intent: "Debt Consolidation".to_string(),
            loan_grade: " b ".to_string(),
            loan_amnt: 15_000.0,
            loan_int_rate: 10.5,
            cb_person_default_on_file: "n".to_string(),
            cb_person_cred_hist_length: 7,
        }
    }

    #[test]
    fn normalizes_categorical_spelling() {
        let application = LoanApplication::try_from(submission()).expect("valid submission");
        assert_eq!(application.home_ownership, HomeOwnership::Rent);
        assert_eq!(application.intent, LoanIntent::DebtConsolidation);
        assert_eq!(application.grade, LoanGrade::B);
        assert_eq!(application.prior_default, DefaultFlag::No);
    }

    #[test]
    fn rejects_unknown_grade_letter() {
        let mut raw = submission();
        raw.loan_grade = "H".to_string();
        let err = LoanApplication::try_from(raw).expect_err("grade H rejected");
        assert_eq!(err.field, "loan_grade");
        assert!(err.to_string().contains("'H'"));
    }

    fn rejected_field(raw: LoanSubmission) -> &'static str {
        LoanApplication::try_from(raw)
            .expect_err("submission rejected")
            .field
    }

    #[test]
    fn rejects_non_positive_denominators() {
        let mut raw = submission();
        raw.person_age = 0;
        assert_eq!(rejected_field(raw), "person_age");

        let mut raw = submission();
        raw.person_income = 0.0;
        assert_eq!(rejected_field(raw), "person_income");

        let mut raw = submission();
        raw.loan_amnt = -250.0;
        assert_eq!(rejected_field(raw), "loan_amnt");
    }

    #[test]
    fn rejects_negative_history_and_employment() {
        let mut raw = submission();
        raw.cb_person_cred_hist_length = -1;
        let err = LoanApplication::try_from(raw).expect_err("negative history");
        assert_eq!(err.field, "cb_person_cred_hist_length");

        let mut raw = submission();
        raw.person_emp_length = -0.5;
        let err = LoanApplication::try_from(raw).expect_err("negative employment");
        assert_eq!(err.field, "person_emp_length");
    }

    #[test]
    fn rejects_unknown_default_flag() {
        let mut raw = submission();
        raw.cb_person_default_on_file = "maybe".to_string();
        let err = LoanApplication::try_from(raw).expect_err("flag rejected");
        assert_eq!(err.field, "cb_person_default_on_file");
    }

    #[test]
    fn grade_numeric_follows_letter_order() {
        let grades = [
            LoanGrade::A,
            LoanGrade::B,
            LoanGrade::C,
            LoanGrade::D,
            LoanGrade::E,
            LoanGrade::F,
            LoanGrade::G,
        ];
        for (index, grade) in grades.into_iter().enumerate() {
            assert_eq!(grade.numeric(), index as u8 + 1, "{grade}");
        }
    }
}
