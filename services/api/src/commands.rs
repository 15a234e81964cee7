use crate::infra::load_engine;
use crate::report::AssessmentReport;
use crate::tool::{RiskToolClient, ToolOutcome};
use chrono::Local;
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{BatchReport, BatchScorer, LoanSubmission, RowOutcome};
use std::path::PathBuf;

/// Loan application fields, named after the wire record.
#[derive(Args, Debug)]
pub(crate) struct ApplicationArgs {
    /// Applicant age in years
    #[arg(long)]
    pub(crate) age: i32,
    /// Annual income
    #[arg(long)]
    pub(crate) income: f64,
    /// RENT, OWN, MORTGAGE, or OTHER
    #[arg(long)]
    pub(crate) home_ownership: String,
    /// Employment length in years
    #[arg(long)]
    pub(crate) emp_length: f64,
    /// EDUCATION, MEDICAL, VENTURE, PERSONAL, DEBTCONSOLIDATION, or HOMEIMPROVEMENT
    #[arg(long)]
    pub(crate) intent: String,
    /// Loan grade A through G
    #[arg(long)]
    pub(crate) grade: String,
    /// Requested loan amount
    #[arg(long)]
    pub(crate) amount: f64,
    /// Interest rate in percent
    #[arg(long)]
    pub(crate) rate: f64,
    /// Previous default on file (Y or N)
    #[arg(long, default_value = "N")]
    pub(crate) prior_default: String,
    /// Credit history length in years
    #[arg(long)]
    pub(crate) credit_history: i32,
}

impl ApplicationArgs {
    pub(crate) fn into_submission(self) -> LoanSubmission {
        LoanSubmission {
            person_age: self.age,
            person_income: self.income,
            person_home_ownership: self.home_ownership,
            person_emp_length: self.emp_length,
            loan_intent: self.intent,
            loan_grade: self.grade,
            loan_amnt: self.amount,
            loan_int_rate: self.rate,
            cb_person_default_on_file: self.prior_default,
            cb_person_cred_hist_length: self.credit_history,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[command(flatten)]
    pub(crate) application: ApplicationArgs,
    /// Print the raw assessment as JSON instead of the report
    #[arg(long)]
    pub(crate) json: bool,
    /// Model artifact to load instead of the configured one
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one application per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print the full batch report as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Model artifact to load instead of the configured one
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    #[command(flatten)]
    pub(crate) application: ApplicationArgs,
    /// Base URL of a running credit risk API
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

fn model_path(config: &AppConfig, override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| config.model.artifact_path.clone())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        application,
        json,
        model,
    } = args;

    let config = AppConfig::load()?;
    let loaded = load_engine(&model_path(&config, model))?;
    let result = loaded.engine.assess(application.into_submission())?;

    if json {
        let rendered = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        let outcome = ToolOutcome::Assessment(result);
        println!("{}", AssessmentReport::new(&outcome, Local::now()));
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs { csv, json, model } = args;

    let config = AppConfig::load()?;
    let loaded = load_engine(&model_path(&config, model))?;
    let report = BatchScorer::new(&loaded.engine).score_path(&csv)?;

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print_batch(&csv, &report);
    }
    Ok(())
}

fn print_batch(csv: &std::path::Path, report: &BatchReport) {
    println!("Batch scoring for {}", csv.display());
    for row in &report.rows {
        match &row.outcome {
            RowOutcome::Scored(result) => println!(
                "- row {}: {} | PD {:.4} | score {} | {}",
                row.row,
                result.decision.label(),
                result.probability,
                result.metadata.credit_score,
                result.risk_level.label()
            ),
            RowOutcome::Failed { error } => println!("- row {}: failed ({error})", row.row),
        }
    }
    println!(
        "Summary: {} approved | {} rejected | {} failed",
        report.summary.approved, report.summary.rejected, report.summary.failed
    );
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        application,
        base_url,
    } = args;

    let base_url = match base_url {
        Some(url) => url,
        None => AppConfig::load()?.client.api_base_url,
    };

    let client = RiskToolClient::new(base_url);
    let outcome = client
        .calculate_credit_risk(application.into_submission())
        .await;
    println!("{}", AssessmentReport::new(&outcome, Local::now()));
    Ok(())
}
