//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione runtime dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConversionOptions` (fps, optimize, quality) passate al motore
//! - Definisce `OptionOverrides`, i valori espliciti passati da CLI
//! - Definisce la struct `Config` con i parametri della sessione
//! - Fornisce validazione dei parametri e valori di default sensati
//! - Risolve la root di installazione e i percorsi di default
//!   (`config/config.json`, `logs/`, `tools/`)
//!
//! ## Parametri di configurazione:
//! - `overrides.fps`: Frame rate della GIF (1-100, default: 15)
//! - `overrides.optimize`: Ottimizzazione a rettangoli differenziali (default: true)
//! - `overrides.quality`: Qualità palette (1-100, default: 80)
//!
//! Le opzioni di conversione seguono la precedenza: default <
//! `CONVERSION_OPTIONS` del file di configurazione < flag da riga di comando.
//! - `workers`: Conversioni parallele (default: 1 = sequenziale)
//! - `config_path`: File con `MOV_FILE_PATHS` (default: None = percorso standard)
//! - `legacy_config`: Legge il file nel formato `NOME = letterale`
//! - `report_path`: Report JSON del batch (default: None)
//! - `fail_on_error`: Exit code 1 se una conversione fallisce (default: false)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     workers: 4,
//!     overrides: OptionOverrides { fps: Some(10), ..Default::default() },
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the installation root
pub const HOME_ENV: &str = "MOV2GIF_HOME";

/// Encoder options, passed through to the conversion engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Frames per second of the produced GIF
    pub fps: u32,
    /// Only re-encode changed rectangles between frames
    pub optimize: bool,
    /// Palette quality (1-100)
    pub quality: u8,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            fps: 15,
            optimize: true,
            quality: 80,
        }
    }
}

impl ConversionOptions {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 || self.fps > 100 {
            return Err(anyhow::anyhow!("Frame rate must be between 1 and 100"));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        Ok(())
    }
}

/// Options given explicitly on the command line; `None` keeps the lower layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionOverrides {
    pub fps: Option<u32>,
    pub optimize: Option<bool>,
    pub quality: Option<u8>,
}

impl OptionOverrides {
    /// Layer the explicit values on top of `base`
    pub fn apply(&self, base: ConversionOptions) -> ConversionOptions {
        ConversionOptions {
            fps: self.fps.unwrap_or(base.fps),
            optimize: self.optimize.unwrap_or(base.optimize),
            quality: self.quality.unwrap_or(base.quality),
        }
    }
}

/// Runtime configuration for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub overrides: OptionOverrides,
    /// Number of conversions running at once
    pub workers: usize,
    /// Explicit configuration file (None = default location)
    pub config_path: Option<PathBuf>,
    /// Read the configuration file as `NAME = literal` assignments
    pub legacy_config: bool,
    /// Write the batch report as JSON to this path
    pub report_path: Option<PathBuf>,
    /// Turn any failed conversion into a non-zero exit status
    pub fail_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overrides: OptionOverrides::default(),
            workers: 1,
            config_path: None,
            legacy_config: false,
            report_path: None,
            fail_on_error: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.overrides.apply(ConversionOptions::default()).validate()?;

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        Ok(())
    }

    /// Default configuration file for the selected format
    pub fn default_config_path(legacy: bool) -> PathBuf {
        let file_name = if legacy { "config.py" } else { "config.json" };
        install_root().join("config").join(file_name)
    }

    /// Default directory for the rolling log files
    pub fn default_log_dir() -> PathBuf {
        install_root().join("logs")
    }
}

/// Directory the application treats as its installation root.
///
/// `$MOV2GIF_HOME` wins; otherwise the executable's directory when it ships a
/// `config/` folder; otherwise the current directory.
pub fn install_root() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
    {
        if exe_dir.join("config").is_dir() {
            return exe_dir;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
