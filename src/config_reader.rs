//! # Configuration Reader Module
//!
//! Legge dal file di configurazione la lista dei video da convertire.
//!
//! ## Responsabilità:
//! - Risolve il percorso (esplicito o di default)
//! - Carica il file tramite la `ConfigSource` scelta (JSON o legacy)
//! - Valida il simbolo `MOV_FILE_PATHS` (lista di stringhe)
//! - Legge le `CONVERSION_OPTIONS` opzionali
//!
//! ## Degradazione:
//! Nessun errore viene propagato: ogni fallimento produce una lista vuota e
//! una sola diagnostica (warning se la configurazione manca, error se è
//! malformata). Il successo non emette diagnostiche.
//!
//! ## Esempio:
//! ```rust,ignore
//! let reader = ConfigReader::new(log);
//! let paths = reader.read_config(None);
//! ```

use crate::{
    config::{Config, ConversionOptions},
    config_source::{describe, AssignmentConfigSource, ConfigSource, ConfigUnit, JsonConfigSource},
    error::ConfigError,
    logging::LogSink,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Symbol holding the list of input paths
pub const PATHS_SYMBOL: &str = "MOV_FILE_PATHS";
/// Optional symbol holding encoder options
pub const OPTIONS_SYMBOL: &str = "CONVERSION_OPTIONS";

/// Everything read from one configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub paths: Vec<String>,
    pub options: Option<ConversionOptions>,
}

/// Stateless loader of conversion targets
pub struct ConfigReader {
    source: Box<dyn ConfigSource>,
    default_path: PathBuf,
    log: Arc<dyn LogSink>,
}

impl ConfigReader {
    /// JSON reader using `config/config.json` under the installation root
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self::with_source(Box::new(JsonConfigSource), Config::default_config_path(false), log)
    }

    /// Legacy `NAME = literal` reader using `config/config.py`
    pub fn legacy(log: Arc<dyn LogSink>) -> Self {
        Self::with_source(Box::new(AssignmentConfigSource), Config::default_config_path(true), log)
    }

    pub fn with_source(
        source: Box<dyn ConfigSource>,
        default_path: impl Into<PathBuf>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            source,
            default_path: default_path.into(),
            log,
        }
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// Paths declared in `MOV_FILE_PATHS`, or an empty list on any failure
    pub fn read_config(&self, location: Option<&Path>) -> Vec<String> {
        self.load(location).paths
    }

    /// Load the paths and the optional conversion options in one pass
    pub fn load(&self, location: Option<&Path>) -> LoadedConfig {
        let unit = match self.load_unit(location) {
            Ok(unit) => unit,
            Err(e) => {
                self.report(&e);
                return LoadedConfig::default();
            }
        };

        let paths = match extract_paths(&unit) {
            Ok(paths) => paths,
            Err(e) => {
                self.report(&e);
                return LoadedConfig::default();
            }
        };

        LoadedConfig {
            paths,
            options: self.extract_options(&unit),
        }
    }

    fn load_unit(&self, location: Option<&Path>) -> Result<ConfigUnit, ConfigError> {
        let path = match location {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => self.default_path.as_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        self.log.debug(&format!(
            "Loading {} configuration: {}",
            self.source.name(),
            path.display()
        ));
        self.source.load(path)
    }

    fn report(&self, error: &ConfigError) {
        self.log.log(error.severity(), &error.to_string());
    }

    fn extract_options(&self, unit: &ConfigUnit) -> Option<ConversionOptions> {
        let value = unit.get(OPTIONS_SYMBOL)?;

        let options = serde_json::from_value::<ConversionOptions>(value.clone())
            .map_err(|e| e.to_string())
            .and_then(|options| options.validate().map(|_| options).map_err(|e| e.to_string()));

        match options {
            Ok(options) => Some(options),
            Err(reason) => {
                self.log.warning(&format!(
                    "Ignoring invalid {}: {}",
                    OPTIONS_SYMBOL, reason
                ));
                None
            }
        }
    }
}

fn extract_paths(unit: &ConfigUnit) -> Result<Vec<String>, ConfigError> {
    let value = unit
        .get(PATHS_SYMBOL)
        .ok_or(ConfigError::MissingSymbol(PATHS_SYMBOL))?;

    let wrong_type = |found: String| ConfigError::WrongType {
        symbol: PATHS_SYMBOL,
        expected: "a list of strings",
        found,
    };

    let Value::Array(items) = value else {
        return Err(wrong_type(describe(value).to_string()));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(path) => Ok(path.clone()),
            other => Err(wrong_type(format!("{} at position {}", describe(other), i))),
        })
        .collect()
}
