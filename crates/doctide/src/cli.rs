//! Command-line interface
//!
//! `doctide [OPTIONS] <PATH>...` regenerates each document and, depending
//! on the flags, overwrites it, prints it, prints a diff, or only checks
//! that it is up to date.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use crate::config::{ConfigError, Options};
use crate::context::{listen_for_ctrl_c, Interrupt};
use crate::doctest::normalize::FormatterKind;
use crate::doctest::regen::{Mode, RegenError, Regenerator};

/// Set by `bazel run` to the directory the command was invoked from.
pub const WORKING_DIRECTORY_VAR: &str = "BUILD_WORKING_DIRECTORY";

/// Regenerate the expected output of `>>>` examples in documentation.
#[derive(Parser, Debug)]
#[command(name = "doctide", version, about)]
pub struct Cli {
    /// Documents to process
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Update files in place
    #[arg(short = 'i', long, conflicts_with_all = ["stdout", "check"])]
    pub in_place: bool,

    /// Print the regenerated text to stdout
    #[arg(long, conflicts_with = "check")]
    pub stdout: bool,

    /// Fail if any document would change
    #[arg(long)]
    pub check: bool,

    /// Print examples as they are executed
    #[arg(short, long)]
    pub verbose: bool,

    /// Document width example source is formatted for
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,

    /// Formatter used to normalize example source
    #[arg(long, value_enum)]
    pub formatter: Option<FormatterKind>,

    /// Give up on an `.await` after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub await_timeout_ms: Option<u64>,

    /// Configuration file (default: `doctide.toml` if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Options from the configuration file with flags applied on top.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)?,
            None => Options::discover(Path::new("."))?,
        };
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(formatter) = self.formatter {
            options.formatter = formatter;
        }
        if self.await_timeout_ms.is_some() {
            options.await_timeout_ms = self.await_timeout_ms;
        }
        options.verbose |= self.verbose;
        Ok(options)
    }

    /// What to do with each regenerated document.
    pub fn mode(&self) -> Mode {
        if self.in_place {
            Mode::InPlace
        } else if self.stdout {
            Mode::Print
        } else {
            Mode::Diff
        }
    }
}

/// Run the command, returning the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(dir) = std::env::var_os(WORKING_DIRECTORY_VAR) {
        std::env::set_current_dir(&dir)
            .with_context(|| format!("failed to change directory to {}", PathBuf::from(&dir).display()))?;
    }

    let options = cli.options()?;
    let interrupt = Interrupt::new();
    listen_for_ctrl_c(interrupt.clone()).context("failed to install Ctrl-C handler")?;
    let regenerator = Regenerator::new(options).with_interrupt(interrupt);

    if cli.check {
        let drifted = check(&cli.paths, &regenerator)?;
        return Ok(if drifted == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mode = cli.mode();
    for path in &cli.paths {
        let result = regenerator.update(path, mode)?;
        tracing::debug!(path = %path.display(), unchanged = result.is_unchanged(), "processed");
    }
    Ok(ExitCode::SUCCESS)
}

// Number of documents that would change
fn check(paths: &[PathBuf], regenerator: &Regenerator) -> anyhow::Result<usize> {
    let mut drifted = 0;
    for path in paths {
        match regenerator.verify(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "up to date"),
            Err(RegenError::Drift { path, diff }) => {
                tracing::warn!(path = %path.display(), "examples are out of date");
                eprint!("{}", diff);
                drifted += 1;
            }
            Err(other) => return Err(other.into()),
        }
    }
    Ok(drifted)
}
