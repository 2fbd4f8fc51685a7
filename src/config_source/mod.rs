//! # Configuration Sources
//!
//! Sorgenti intercambiabili che trasformano un file in un insieme di
//! simboli con nome (`MOV_FILE_PATHS`, `CONVERSION_OPTIONS`, ...):
//! - `json`: oggetto JSON, formato di default
//! - `assignment`: istruzioni `NOME = letterale` (compatibilità legacy,
//!   abilitata solo esplicitamente); nessun codice viene eseguito
//!
//! La validazione dei simboli resta nel `ConfigReader`.

pub mod assignment;
pub mod json;

pub use assignment::AssignmentConfigSource;
pub use json::JsonConfigSource;

use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::path::Path;

/// A loadable unit of configuration
pub trait ConfigSource: Send + Sync {
    /// Short format name used in diagnostics
    fn name(&self) -> &'static str;

    fn load(&self, path: &Path) -> Result<ConfigUnit, ConfigError>;
}

/// Symbols declared by one loaded configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUnit {
    symbols: Map<String, Value>,
}

impl ConfigUnit {
    pub fn new(symbols: Map<String, Value>) -> Self {
        Self { symbols }
    }

    pub fn get(&self, symbol: &str) -> Option<&Value> {
        self.symbols.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Human-readable name of a value's shape
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn load_error(path: &Path, reason: impl ToString) -> ConfigError {
    ConfigError::Load {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
