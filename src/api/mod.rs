//! Command line and HTTP surface around the segmentation engine.

mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use crate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
