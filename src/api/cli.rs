use crate::api::commands::{run_clusters, run_score, ScoreArgs};
use crate::api::server;
use crate::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Segment",
    about = "Score credit applicants against historical risk segments",
    version
)]
struct Cli {
    /// Override the configured historical dataset (CSV)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single applicant record and print the assessment
    Score(ScoreArgs),
    /// Print the per-cluster default and approval rates
    Clusters,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, cli.dataset).await,
        Command::Score(args) => run_score(args, cli.dataset),
        Command::Clusters => run_clusters(cli.dataset),
    }
}
