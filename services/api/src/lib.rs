mod cli;
mod infra;
mod routes;
mod server;

use listings_gateway::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
