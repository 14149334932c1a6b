mod cli;
pub mod controllers;
pub mod error;
pub mod infra;
pub mod middleware;
pub mod routes;
mod server;
pub mod views;

pub use infra::AppState;
pub use routes::app_router;

use dissolution::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
