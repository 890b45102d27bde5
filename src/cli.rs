use crate::demo::{run_demo, run_evaluate, run_roster, DemoArgs, EvaluateArgs, RosterArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use provider_rules::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Provider Rules",
    about = "Evaluate credentialing rules against healthcare provider records",
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
    /// Evaluate a single provider from a JSON request file
    Evaluate(EvaluateArgs),
    /// Evaluate every provider in a roster CSV export
    Roster(RosterArgs),
    /// Seed the sample providers and evaluate them
    Demo(DemoArgs),
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Roster(args) => run_roster(args),
        Command::Demo(args) => run_demo(args),
    }
}
