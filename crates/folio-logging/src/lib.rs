//! Logging setup for Folio
//!
//! Folio crates log through the `tracing` facade and never install a
//! subscriber themselves. Applications and tests do that with this crate.
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines for log aggregation (default)
//! - **Pretty Output**: Human-readable console output for development
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//! - **Event Counting**: [`EventCounterLayer`] for asserting on emitted events
//!
//! # Quick Start
//!
//! ```ignore
//! use folio_logging::{FolioSubscriberBuilder, LogConfig};
//!
//! // JSONL to console
//! FolioSubscriberBuilder::new().init();
//!
//! // Development mode with pretty output
//! FolioSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//!
//! // Production: keep the guard alive until exit so the file writer flushes
//! let _guard = FolioSubscriberBuilder::new()
//!     .with_config(LogConfig::production("/var/log/folio"))
//!     .try_init()?;
//! ```

pub mod config;
pub mod layers;

pub use config::{ConsoleFormat, FileOutput, JsonContext, LogConfig, Rollover};
pub use layers::EventCounterLayer;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Registry with the level filter applied
pub type FilteredRegistry = Layered<EnvFilter, Registry>;

/// An output layer over [`FilteredRegistry`]
pub type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// The subscriber assembled by [`FolioSubscriberBuilder::build`]
pub type FolioSubscriber = Layered<Vec<BoxedLayer>, FilteredRegistry>;

/// Errors raised while setting up logging
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid filter directives: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Log file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log appender error: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("Subscriber initialization failed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Builder for configuring and initializing the Folio logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct FolioSubscriberBuilder {
    config: LogConfig,
    env_override: bool,
}

impl FolioSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
            env_override: true,
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Enable or disable console output
    ///
    /// Enabling keeps a format already configured and falls back to JSONL.
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console = match (enabled, self.config.console) {
            (false, _) => None,
            (true, Some(format)) => Some(format),
            (true, None) => Some(ConsoleFormat::Json),
        };
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, file: FileOutput) -> Self {
        self.config.file = Some(file);
        self
    }

    /// Override the level for one target
    pub fn with_target(mut self, target: impl Into<String>, level: impl Into<String>) -> Self {
        self.config = self.config.with_target(target, level);
        self
    }

    /// Ignore `RUST_LOG` and use the configured directives only
    pub fn without_env_override(mut self) -> Self {
        self.env_override = false;
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if self.env_override
            && let Ok(filter) = EnvFilter::try_from_default_env()
        {
            return Ok(filter);
        }
        Ok(EnvFilter::try_new(self.config.directives())?)
    }

    fn console_layer(&self) -> Option<BoxedLayer> {
        match self.config.console? {
            ConsoleFormat::Pretty { ansi } => Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .boxed(),
            ),
            ConsoleFormat::Json => Some(json_layer(self.config.json, std::io::stdout)),
        }
    }

    fn file_layer(&self) -> Result<Option<(BoxedLayer, WorkerGuard)>, LoggingError> {
        let Some(file) = &self.config.file else {
            return Ok(None);
        };
        let (writer, guard) = file_writer(file)?;
        Ok(Some((json_layer(self.config.json, writer), guard)))
    }

    /// Assemble the subscriber without installing it
    ///
    /// Useful with `tracing::subscriber::with_default` for scoped capture.
    /// The returned guard, when present, must outlive all logging to the
    /// file output.
    pub fn build(self) -> Result<(FolioSubscriber, Option<WorkerGuard>), LoggingError> {
        let filter = self.filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if let Some(console) = self.console_layer() {
            layers.push(console);
        }
        if let Some((file, file_guard)) = self.file_layer()? {
            layers.push(file);
            guard = Some(file_guard);
        }

        let subscriber = Registry::default().with(filter).with(layers);
        Ok((subscriber, guard))
    }

    /// Try to initialize the subscriber globally
    ///
    /// Returns an error if a global subscriber has already been set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let (subscriber, guard) = self.build()?;
        subscriber.try_init()?;
        Ok(guard)
    }

    /// Initialize the subscriber globally
    ///
    /// Setup failures are reported on stderr and leave logging unconfigured.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                None
            }
        }
    }
}

impl Default for FolioSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattened JSON lines, one event per line
fn json_layer<W>(context: JsonContext, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(context.spans)
        .with_span_list(context.spans)
        .with_file(context.location)
        .with_line_number(context.location)
        .with_thread_ids(context.threads)
        .with_thread_names(context.threads)
        .with_writer(writer)
        .boxed()
}

/// Writer for file output; truncates for `Never` rollover, appends otherwise
fn file_writer(file: &FileOutput) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let rotation = match file.rollover {
        Rollover::Never => {
            fs::create_dir_all(&file.directory)?;
            let handle = File::create(file.directory.join(format!("{}.log", file.prefix)))?;
            return Ok(tracing_appender::non_blocking(handle));
        }
        Rollover::Daily => Rotation::DAILY,
        Rollover::Hourly => Rotation::HOURLY,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file.prefix.as_str())
        .filename_suffix("log");
    if let Some(retain) = file.retain {
        builder = builder.max_log_files(retain);
    }
    let appender = builder.build(&file.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}
