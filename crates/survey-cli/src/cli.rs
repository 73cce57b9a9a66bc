use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::cmd::{
    self, admin::AdminArgs, check::CheckArgs, export::ExportArgs, run::RunArgs,
    summary::SummaryArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "survey",
    about = "Bilingual industry survey toolkit",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log debug details to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate a survey configuration
    Check(CheckArgs),
    /// Print the JSON Schema of the survey configuration
    Schema,
    /// Export response rows as CSV or JSON
    Export(ExportArgs),
    /// Summarize response rows by industry and region
    Summary(SummaryArgs),
    /// Sign in as admin and export responses from the configured backend
    Admin(AdminArgs),
    /// Answer the survey in the terminal
    Run(RunArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Check(args) => cmd::check::run(args),
        Commands::Schema => cmd::schema::run(),
        Commands::Export(args) => cmd::export::run(args),
        Commands::Summary(args) => cmd::summary::run(args),
        Commands::Admin(args) => cmd::admin::run(args),
        Commands::Run(args) => cmd::run::run(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
