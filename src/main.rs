use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spark_life::{app, install_interrupt_handler, Args, CancelToken, RunConfig, TerminalSurface};

fn main() -> ExitCode {
    // stdout is the display; logs go to stderr and stay quiet by default.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = RunConfig::from(Args::parse());

    let cancel = CancelToken::new();
    if let Err(err) = install_interrupt_handler(&cancel) {
        tracing::warn!(error = %err, "Ctrl+C will not stop the run cleanly");
    }

    match app::run(&config, TerminalSurface::stdout(), cancel) {
        Ok(report) => {
            tracing::info!(?report.outcome, rendered = report.rendered, "exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "fatal");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
