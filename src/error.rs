//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore del dominio.
//!
//! ## Responsabilità:
//! - `ConfigError`: errori di risoluzione/caricamento della configurazione
//! - `ConversionError`: errori sollevati dal motore di conversione
//!
//! Nessuno dei due è fatale: `ConfigError` viene recuperato nel
//! `ConfigReader` (lista vuota + diagnostica), `ConversionError` viene
//! recuperato per singolo file nell'orchestratore (esito `false`).
//!
//! ## Esempio:
//! ```rust,ignore
//! if !path.exists() {
//!     return Err(ConfigError::NotFound(path.to_path_buf()));
//! }
//! ```

use crate::logging::LogLevel;
use std::path::PathBuf;

/// Failures while resolving the list of conversion targets
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration file {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("{0} is not defined in the configuration file")]
    MissingSymbol(&'static str),

    #[error("{symbol} must be {expected}, found {found}")]
    WrongType {
        symbol: &'static str,
        expected: &'static str,
        found: String,
    },
}

impl ConfigError {
    /// Severity used when the error is reported and swallowed.
    ///
    /// "Nothing configured" is a warning, a malformed file is an error.
    pub fn severity(&self) -> LogLevel {
        match self {
            ConfigError::NotFound(_) | ConfigError::MissingSymbol(_) => LogLevel::Warning,
            ConfigError::Load { .. } | ConfigError::WrongType { .. } => LogLevel::Error,
        }
    }
}

/// Failures raised inside the conversion engine boundary
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("ffprobe error: {0}")]
    Probe(String),

    #[error("No video stream in {}", .0.display())]
    NoVideoStream(PathBuf),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Dependency missing: {0}")]
    MissingTool(String),

    #[error("Conversion task aborted: {0}")]
    Aborted(String),
}
