mod cli;
mod commands;
mod infra;
mod report;
mod routes;
mod server;
mod tool;

use credit_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
