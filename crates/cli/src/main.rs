mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edge-deploy")]
#[command(version, about = "Deploy Supabase Edge Functions via the Management API", long_about = None)]
struct Cli {
    /// Directory containing one folder per function
    #[arg(long, default_value = edge_deploy_core::DEFAULT_FUNCTIONS_ROOT)]
    functions_root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser)]
enum Command {
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => commands::deploy::run(cli.functions_root).await,
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "edge-deploy", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
