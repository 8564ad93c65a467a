//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the daemon and its
//! subcommands: a compact console layer, an optional rolling log file
//! (plain or JSON lines) written on a background thread, and an
//! [`EnvFilter`] seeded from the configured level that `RUST_LOG` can override.
//!
//! ## Example
//!
//! ```rust
//! # use zb_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("zwembot")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);

mod private {
    pub trait Sealed {}
}
impl private::Sealed for Unnamed {}
impl private::Sealed for Named {}

/// Typestate builder for the global subscriber. A name is mandatory before
/// [`LoggerBuilder::init`] becomes available, since it prefixes the log files.
#[derive(Debug)]
pub struct LoggerBuilder<N: private::Sealed = Unnamed> {
    config: LoggerConfig,
    name: N,
}

impl LoggerBuilder<Unnamed> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder { config: self.config, name: Named(name.into()) }
    }
}

impl LoggerBuilder<Named> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Programmatic filter directives (e.g. `zb_reconciler=debug,reqwest=warn`).
    /// `RUST_LOG` is ignored when this is set.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Also write logs to rolling files inside `directory`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = Some(directory.into());
        self
    }

    /// Same as [`Self::directory`], but a `None` leaves file output disabled.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn maybe_directory(self, directory: Option<impl Into<PathBuf>>) -> Self {
        match directory {
            Some(dir) => self.directory(dir),
            None => self,
        }
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// File output as JSON lines. Console output stays human readable.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the background writer of the file layer; keep
    /// it alive until shutdown or buffered lines are lost.
    ///
    /// # Errors
    /// [`LoggerError::Subscriber`] if a global subscriber is already set,
    /// [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    /// an unparsable filter or no enabled output.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { config, name: Named(name) } = self;
        validate(&config, &name)?;

        let filter = env_filter(&config)?;
        let mut layers = Vec::new();

        if config.console {
            layers.push(layer().compact().with_ansi(true).with_target(false).boxed());
        }

        let guard = match &config.directory {
            Some(directory) => {
                std::fs::create_dir_all(directory).context(format!(
                    "Failed to create log directory: {}",
                    directory.display()
                ))?;

                let appender = RollingFileAppender::builder()
                    .rotation(config.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(config.max_files)
                    .build(directory)?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if config.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Neither console nor file output is enabled".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { name, guard })
    }
}

/// Handle to the installed subscriber. Dropping it flushes the file writer.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    name: String,
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: Unnamed }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a rolling file writer is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!(logger = %self.name, "Flushing log files");
        }
    }
}

fn validate(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{directives}': {e}").into(),
                context: None,
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("zwembot-test");
        assert!(builder.config.console);
        assert!(!builder.config.json);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.max_files, DEFAULT_MAX_FILES);
        assert!(builder.config.directory.is_none());
    }

    #[test]
    fn maybe_directory_only_sets_some() {
        let none: Option<PathBuf> = None;
        let builder = Logger::builder().name("zwembot-test").maybe_directory(none);
        assert!(builder.config.directory.is_none());

        let builder = Logger::builder().name("zwembot-test").maybe_directory(Some("logs"));
        assert_eq!(builder.config.directory.as_deref(), Some(std::path::Path::new("logs")));
    }

    #[test]
    fn empty_name_is_rejected_before_install() {
        let err = Logger::builder().name("  ").init().expect_err("empty name must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_max_files_is_rejected() {
        let err = Logger::builder()
            .name("zwembot-test")
            .max_files(0)
            .init()
            .expect_err("zero max files must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn bad_filter_is_rejected() {
        let err = Logger::builder()
            .name("zwembot-test")
            .env_filter("zb_reconciler=loud")
            .init()
            .expect_err("invalid directive must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn no_output_is_rejected() {
        let err = Logger::builder()
            .name("zwembot-test")
            .console(false)
            .init()
            .expect_err("no layers must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
