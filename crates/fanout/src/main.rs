//! fanout binary.

use clap::Parser;
use fanout::cli::{Cli, Commands, handle_health_command, handle_run_command};
use fanout::init_tracing;
use fanout_error::{FanoutError, FanoutErrorKind};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Interrupted by Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env before settings read FANOUT_* variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    tokio::select! {
        outcome = run(cli.command) => match outcome {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "fanout failed");
                ExitCode::from(exit_code(&e))
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning in-flight requests");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(command: Commands) -> Result<(), FanoutError> {
    match command {
        Commands::Run(args) => {
            let report = handle_run_command(args).await?;
            info!(
                succeeded = report.succeeded(),
                failed = report.failed(),
                "Run finished"
            );
        }
        Commands::Health(args) => handle_health_command(args).await?,
    }
    Ok(())
}

/// 2 when every request of a batch failed, 1 for anything that stopped the
/// batch from running.
fn exit_code(err: &FanoutError) -> u8 {
    match err.kind() {
        FanoutErrorKind::Batch(_) => 2,
        FanoutErrorKind::Transport(_)
        | FanoutErrorKind::Client(_)
        | FanoutErrorKind::Config(_) => 1,
    }
}
