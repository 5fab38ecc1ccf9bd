//! Run configuration
//!
//! Options come from an optional `doctide.toml`; command-line flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::doctest::normalize::FormatterKind;
use crate::environment::DEFAULT_MAX_CALL_DEPTH;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "doctide.toml";

/// Default document width.
pub const DEFAULT_WIDTH: usize = 80;

/// Failure to load a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid configuration
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// TOML error
        source: toml::de::Error,
    },
}

/// Settings for regenerating documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Options {
    /// Document width the example source is formatted for
    pub width: usize,

    /// Formatter used to normalize example source
    pub formatter: FormatterKind,

    /// Upper bound for each `.await`, in milliseconds
    pub await_timeout_ms: Option<u64>,

    /// Limit for nested function calls in examples
    pub max_call_depth: usize,

    /// Print each example's source as it runs
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            formatter: FormatterKind::default(),
            await_timeout_ms: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            verbose: false,
        }
    }
}

impl Options {
    /// Parse options from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load options from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load `doctide.toml` from `dir` if there is one, else the defaults.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// The await timeout as a duration.
    pub fn await_timeout(&self) -> Option<Duration> {
        self.await_timeout_ms.map(Duration::from_millis)
    }
}
