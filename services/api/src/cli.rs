use crate::report::{run_init, run_report, InitArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kpi_scorecard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KPI Scorecard",
    about = "Serve and report store-manager KPI achievement scorecards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the manager ranking for a snapshot file
    Report(ReportArgs),
    /// Write a default snapshot with every value at zero and every month open
    Init(InitArgs),
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
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Init(args) => run_init(args),
    }
}
