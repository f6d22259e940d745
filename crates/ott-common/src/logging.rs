//! Logging configuration and initialization
//!
//! Every binary in the workspace sets up `tracing` through [`init_logging`]. The
//! library crates only emit events through the `tracing` macros and never print
//! directly.
//!
//! Output can go to the console, to a daily rolling file, or both, as
//! human-readable text or JSON.
//!
//! # Example
//!
//! ```no_run
//! use ott_common::logging::{init_logging, LogConfig, LogLevel};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::builder().level(LogLevel::Debug).build();
//!     let _guard = init_logging(&config)?;
//!
//!     info!(version = "ott3.6", "Loading taxonomy");
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// Output target for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard error only
    #[default]
    Console,
    /// Rolling log file only
    File,
    /// Standard error and rolling log file
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl std::str::FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stderr" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(anyhow::anyhow!("Invalid log output: {}", s)),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,

    /// Output target (console, file, or both)
    pub output: LogOutput,

    /// Log format (text or JSON)
    pub format: LogFormat,

    /// Directory for log files, used when output includes a file
    pub log_dir: PathBuf,

    /// Log file name prefix ("ott-taxonomy" -> "ott-taxonomy.2026-10-19")
    pub log_file_prefix: String,

    /// Extra filter directives, e.g. "reqwest=warn,ott_taxonomy::fetch=trace"
    pub filter_directives: Option<String>,

    /// Whether to include target module names in logs
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "ott".to_string(),
            filter_directives: None,
            include_targets: true,
        }
    }
}

impl LogConfig {
    /// Create a builder for fluent configuration
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Overlay environment variables on top of this configuration
    ///
    /// Environment variables:
    /// - `OTT_LOG_LEVEL`: trace, debug, info, warn, error
    /// - `OTT_LOG_OUTPUT`: console, file, both
    /// - `OTT_LOG_FORMAT`: text, json
    /// - `OTT_LOG_DIR`: directory for log files
    /// - `OTT_LOG_FILTER`: additional filter directives
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("OTT_LOG_LEVEL") {
            self.level = level.parse()?;
        }

        if let Ok(output) = std::env::var("OTT_LOG_OUTPUT") {
            self.output = output.parse()?;
        }

        if let Ok(format) = std::env::var("OTT_LOG_FORMAT") {
            self.format = format.parse()?;
        }

        if let Ok(dir) = std::env::var("OTT_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }

        if let Ok(filter) = std::env::var("OTT_LOG_FILTER") {
            self.filter_directives = Some(filter);
        }

        Ok(self)
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::builder()
            .with_default_directive(self.level.to_tracing_level().into())
            .from_env_lossy();

        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',').filter(|d| !d.trim().is_empty()) {
                filter = filter.add_directive(
                    directive
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid filter directive '{directive}'"))?,
                );
            }
        }

        Ok(filter)
    }

    fn fmt_layer<W>(&self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(self.include_targets)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(ansi);

        match self.format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_targets(mut self, include: bool) -> Self {
        self.config.include_targets = include;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Initialize the global tracing subscriber
///
/// Call once at startup. When the output includes a file, the returned guard
/// flushes the background writer on drop and must be held until exit.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    let mut guard = None;

    if config.output.console() {
        // stdout is reserved for command output
        layers.push(config.fmt_layer(std::io::stderr, true));
    }

    if config.output.file() {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        layers.push(config.fmt_layer(writer, false));
        guard = Some(worker_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(config.env_filter()?)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_output_targets() {
        let both: LogOutput = "all".parse().unwrap();
        assert!(both.console() && both.file());

        let file: LogOutput = "file".parse().unwrap();
        assert!(!file.console() && file.file());

        assert!("syslog".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Both)
            .format(LogFormat::Json)
            .log_dir("/tmp/ott-logs")
            .log_file_prefix("ott-taxonomy")
            .filter_directives("reqwest=warn")
            .build();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.output, LogOutput::Both);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/ott-logs"));
        assert_eq!(config.log_file_prefix, "ott-taxonomy");
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_invalid_filter_directive() {
        let config = LogConfig::builder().filter_directives("reqwest=loudest").build();
        assert!(config.env_filter().is_err());
    }
}
