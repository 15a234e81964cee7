use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::decision::Decision;
use super::domain::LoanSubmission;
use super::engine::{DecisionResult, RiskEngine};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read application CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid application CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome for a single CSV row. `row` is 1-based and excludes the header.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub row: usize,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RowOutcome {
    Scored(DecisionResult),
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub approved: usize,
    pub rejected: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
    pub summary: BatchSummary,
}

/// Scores loan applications from a CSV export.
///
/// Headers use the wire field names; unrelated columns (e.g. `loan_status`)
/// are ignored. A row that fails to decode or validate is recorded and the
/// batch continues.
pub struct BatchScorer<'a> {
    engine: &'a RiskEngine,
}

impl<'a> BatchScorer<'a> {
    pub fn new(engine: &'a RiskEngine) -> Self {
        Self { engine }
    }

    pub fn score_path<P: AsRef<Path>>(&self, path: P) -> Result<BatchReport, BatchError> {
        let file = std::fs::File::open(path)?;
        self.score_reader(file)
    }

    pub fn score_reader<R: Read>(&self, reader: R) -> Result<BatchReport, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        csv_reader.headers()?;

        let mut rows = Vec::new();
        let mut summary = BatchSummary::default();

        for (index, record) in csv_reader.deserialize::<LoanSubmission>().enumerate() {
            let row = index + 1;
            let outcome = match record {
                Ok(submission) => match self.engine.assess(submission) {
                    Ok(result) => {
                        match result.decision {
                            Decision::Approved => summary.approved += 1,
                            Decision::Rejected => summary.rejected += 1,
                        }
                        RowOutcome::Scored(result)
                    }
                    Err(err) => {
                        summary.failed += 1;
                        RowOutcome::Failed {
                            error: err.to_string(),
                        }
                    }
                },
                Err(err) if is_row_error(&err) => {
                    warn!(row, error = %err, "skipping undecodable CSV row");
                    summary.failed += 1;
                    RowOutcome::Failed {
                        error: err.to_string(),
                    }
                }
                Err(err) => return Err(err.into()),
            };
            rows.push(BatchRow { row, outcome });
        }

        info!(
            approved = summary.approved,
            rejected = summary.rejected,
            failed = summary.failed,
            "batch scoring finished"
        );

        Ok(BatchReport { rows, summary })
    }
}

fn is_row_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::Deserialize { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}
