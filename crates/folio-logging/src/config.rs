//! What the subscriber builder writes, where, and at which level

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Rendering of console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleFormat {
    /// One JSON object per line
    Json,
    /// Multi-line human-readable output, optionally colored
    Pretty { ansi: bool },
}

/// When a log file is closed and a new one started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rollover {
    #[default]
    Daily,
    Hourly,
    /// One file, `<prefix>.log`, truncated when logging starts
    Never,
}

/// JSON-lines output to a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutput {
    pub directory: PathBuf,
    pub prefix: String,
    pub rollover: Rollover,
    /// Rolled files kept on disk; `None` keeps them all
    pub retain: Option<usize>,
}

impl FileOutput {
    /// Daily files named `folio.<date>.log`, a week of them kept
    pub fn daily(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: "folio".to_string(),
            rollover: Rollover::Daily,
            retain: Some(7),
        }
    }

    /// A single `<prefix>.log` that is never rolled
    pub fn single(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            rollover: Rollover::Never,
            retain: None,
        }
    }
}

/// Extra context attached to each JSON line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonContext {
    /// Current span and the span list
    pub spans: bool,
    /// Source file and line
    pub location: bool,
    /// Thread id and name
    pub threads: bool,
}

impl Default for JsonContext {
    fn default() -> Self {
        Self {
            spans: true,
            location: true,
            threads: false,
        }
    }
}

/// Logging setup consumed by [`FolioSubscriberBuilder`](crate::FolioSubscriberBuilder)
///
/// `RUST_LOG`, when set, replaces `level` and `targets` entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level for targets without an override
    pub level: String,
    /// Per-target levels, e.g. `folio_storage = "warn"`
    pub targets: BTreeMap<String, String>,
    /// Console output, if any
    pub console: Option<ConsoleFormat>,
    pub file: Option<FileOutput>,
    pub json: JsonContext,
}

impl Default for LogConfig {
    /// `info` as JSON lines on the console
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            targets: BTreeMap::new(),
            console: Some(ConsoleFormat::Json),
            file: None,
            json: JsonContext::default(),
        }
    }
}

impl LogConfig {
    /// `debug` with colored pretty console output
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            console: Some(ConsoleFormat::Pretty { ansi: true }),
            ..Self::default()
        }
    }

    /// `info` to daily files under `log_dir`, kept for a month; no console
    pub fn production(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            console: None,
            file: Some(FileOutput {
                retain: Some(30),
                ..FileOutput::daily(log_dir)
            }),
            ..Self::default()
        }
    }

    /// Warnings and errors only, plain JSON on the console
    pub fn testing() -> Self {
        Self {
            level: "warn".to_string(),
            json: JsonContext {
                spans: false,
                location: false,
                threads: false,
            },
            ..Self::default()
        }
    }

    /// Override the level for one target
    pub fn with_target(mut self, target: impl Into<String>, level: impl Into<String>) -> Self {
        self.targets.insert(target.into(), level.into());
        self
    }

    /// Filter directives in `EnvFilter` syntax: the level, then each
    /// override in target order
    pub fn directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.targets
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}
