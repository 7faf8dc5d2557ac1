mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use academic_standing::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
