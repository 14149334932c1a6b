use clap::{Args, Parser, Subcommand};
use dissolution::company_number::sanitize_company_number;
use dissolution::error::AppError;

use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Close a company",
    about = "Run the close-a-company web front-end and its supporting tools",
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
    /// Print a company number the way the search page normalises it
    SanitizeCompany(SanitizeArgs),
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

#[derive(Args, Debug)]
pub(crate) struct SanitizeArgs {
    /// Company number as typed by a user, e.g. "sc 1234"
    number: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::SanitizeCompany(args) => {
            println!("{}", sanitize(&args)?);
            Ok(())
        }
    }
}

fn sanitize(args: &SanitizeArgs) -> Result<String, AppError> {
    Ok(sanitize_company_number(Some(&args.number))?)
}
