//! doctide CLI entry point

use std::process::ExitCode;

use clap::Parser;
use doctide::cli::{run, Cli};

/// Deeply nested example code recurses through the evaluator.
const STACK_SIZE: usize = 64 * 1024 * 1024;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so `--stdout` output stays clean
    let default_level = if cli.verbose { "info" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let worker = std::thread::Builder::new()
        .name("doctide".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || run(cli));
    let worker = match worker {
        Ok(worker) => worker,
        Err(err) => {
            eprintln!("error: failed to start worker thread: {err}");
            return ExitCode::FAILURE;
        }
    };

    match worker.join() {
        Ok(Ok(code)) => code,
        Ok(Err(err)) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
        // The panic message has already been printed
        Err(_) => ExitCode::FAILURE,
    }
}
