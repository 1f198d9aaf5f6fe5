mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dfgate_runner::GateError;

#[derive(Parser)]
#[command(
    name = "dfgate",
    about = "Regenerate Dockerfiles, reject drift, and build-test changed contexts"
)]
#[command(version)]
struct Cli {
    /// Tool config file (default: $TRAVIS_BUILD_DIR/dfgate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate, check for drift, and build when needed (default)
    Run,
    /// Regenerate and check for drift without building
    Check,
    /// Run the build test for the configured context only
    Build,
    /// Show the resolved configuration without running anything
    Plan {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="an unset or invalid RUST_LOG means the default `info` filter"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // arch-lint: allow(no-silent-result-drop) reason="no subcommand means `run`"
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run(config_path).await,
        Commands::Check => commands::check(config_path).await,
        Commands::Build => commands::build(config_path).await,
        Commands::Plan { json } => commands::plan(config_path, json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(exit_status(&e))
        }
    }
}

/// A failed build test exits with the build's own code; everything else exits 1.
fn exit_status(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<GateError>()
        .map_or(1, GateError::exit_code)
}
