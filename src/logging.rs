//! # Logging Module
//!
//! Sink di logging condiviso dall'intera applicazione.
//!
//! ## Responsabilità:
//! - `init_logging()`: configura `tracing-subscriber` con output su stderr
//!   e file giornaliero a rotazione (`logs/app.<data>.log`, 7 file)
//! - `LogSink`: contratto a livelli (debug, info, warning, error, critical)
//!   iniettato esplicitamente in ogni componente
//! - `TracingLog`: implementazione che inoltra ai macro di `tracing`
//!
//! Una sola istanza di `TracingLog` viene creata in `main` e passata come
//! `Arc<dyn LogSink>`, niente stato globale nascosto nei componenti.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Severity accepted by a [`LogSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// Leveled message sink shared by every component
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
}

/// Forwards to the global `tracing` subscriber installed by [`init_logging`]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Critical => tracing::error!(critical = true, "{}", message),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the rolling log files
    pub log_dir: PathBuf,
    /// Number of daily files kept on disk
    pub max_files: usize,
    pub verbose: bool,
}

impl LogConfig {
    pub fn new(log_dir: impl AsRef<Path>, verbose: bool) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            max_files: 7,
            verbose,
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the whole run. When the file layer cannot be created the subscriber
/// falls back to stderr only and `None` is returned.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let level = if config.verbose { "debug" } else { "info" };
    let env_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match build_file_appender(config) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .with(file_layer)
                .init();

            tracing::debug!(log_dir = ?config.log_dir, "Logging system initialized");
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .init();

            tracing::warn!("File logging disabled: {:#}", e);
            None
        }
    }
}

fn build_file_appender(config: &LogConfig) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {}", config.log_dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("app")
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log file in {}", config.log_dir.display()))
}
