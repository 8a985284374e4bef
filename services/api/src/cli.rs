use crate::demo::{run_demo, run_roster_check, DemoArgs, RosterCheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hr_recruitment::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "HR Recruitment",
    about = "Run and demonstrate the recruitment and onboarding service from the command line",
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
    /// Inspect a division roster before seeding it
    Roster {
        #[command(subcommand)]
        command: RosterCommand,
    },
    /// Walk a candidate from submission to staff account and back out through offboarding
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RosterCommand {
    /// Validate a roster CSV and print the resulting division capacity
    Check(RosterCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Division roster CSV used to seed capacity at startup
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Roster {
            command: RosterCommand::Check(args),
        } => run_roster_check(args),
        Command::Demo(args) => run_demo(args),
    }
}
