//! Telemetry and tracing utilities
//!
//! Helpers for installing a `tracing` subscriber that shows this crate's
//! stream logs (`chat_stream` spans, skipped frames, phase transitions).
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatflux::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use crate::error::{LlmError, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl std::str::FromStr for OutputFormat {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            _ => Err(LlmError::ConfigurationError(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to stderr
    pub enable_console: bool,
    /// Also write to this file (never rotated)
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug-level text output on the console.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    enable_console: Option<bool>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string (`trace` ... `error`).
    pub fn log_level_str(mut self, level: &str) -> Result<Self> {
        let level = match level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => {
                return Err(LlmError::ConfigurationError(format!(
                    "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
                )));
            }
        };
        self.log_level = Some(level);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.enable_console = Some(enable);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            enable_console: self.enable_console.unwrap_or(true),
            log_file: self.log_file,
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer<W>(format: OutputFormat, writer: W) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        OutputFormat::Text => fmt::layer().with_target(true).with_writer(writer).boxed(),
        OutputFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed(),
        OutputFormat::JsonCompact => fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    }
}

/// Install a global subscriber built from `config`.
///
/// Returns the file writer's guard when file logging is enabled; keep it alive
/// for as long as logs should be flushed. An already installed global
/// subscriber is left in place and reported as `Ok(None)`.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>> {
    let level = config.log_level.as_str().to_lowercase();
    let filter = EnvFilter::try_new(format!("chatflux={level}"))
        .map_err(|e| LlmError::ConfigurationError(format!("Invalid log filter: {e}")))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.enable_console {
        layers.push(format_layer(config.output_format, std::io::stderr));
    }

    let mut guard = None;
    if let Some(path) = &config.log_file {
        let file_name = path.file_name().ok_or_else(|| {
            LlmError::ConfigurationError(format!("Log file path has no file name: {}", path.display()))
        })?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        layers.push(format_layer(config.output_format, writer));
        guard = Some(worker_guard);
    }

    match tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        Ok(()) => Ok(guard),
        Err(e) => {
            let message = e.to_string();
            if message.contains("already been set") || message.contains("already initialized") {
                Ok(None)
            } else {
                Err(LlmError::ConfigurationError(format!(
                    "Failed to initialize tracing: {message}"
                )))
            }
        }
    }
}

/// Install a subscriber with default configuration.
pub fn init_default() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::default())
}

/// Initialize from environment variables
///
/// - `CHATFLUX_LOG_LEVEL`: trace, debug, info, warn, error
/// - `CHATFLUX_LOG_FORMAT`: text, json, json-compact
/// - `CHATFLUX_LOG_FILE`: log file path
pub fn init_from_env() -> Result<Option<WorkerGuard>> {
    init_subscriber(config_from_env()?)
}

fn config_from_env() -> Result<SubscriberConfig> {
    let mut builder = SubscriberConfig::builder();
    if let Ok(level) = std::env::var("CHATFLUX_LOG_LEVEL") {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var("CHATFLUX_LOG_FORMAT") {
        builder = builder.output_format(format.parse()?);
    }
    if let Ok(file_path) = std::env::var("CHATFLUX_LOG_FILE") {
        builder = builder.log_file(file_path);
    }
    Ok(builder.build())
}
