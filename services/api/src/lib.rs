mod cli;
mod diagnose;
mod infra;
mod routes;
mod server;

use spot_eraser::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
