//! JSON configuration files: a top-level object whose keys are the symbols.
//!
//! ```json
//! {
//!   "MOV_FILE_PATHS": ["/Users/me/Movies/clip.mov"],
//!   "CONVERSION_OPTIONS": { "fps": 15, "optimize": true, "quality": 80 }
//! }
//! ```

use super::{describe, load_error, ConfigSource, ConfigUnit};
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConfigSource;

impl ConfigSource for JsonConfigSource {
    fn name(&self) -> &'static str {
        "json"
    }

    fn load(&self, path: &Path) -> Result<ConfigUnit, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| load_error(path, e))?;

        match serde_json::from_str::<Value>(&content).map_err(|e| load_error(path, e))? {
            Value::Object(symbols) => Ok(ConfigUnit::new(symbols)),
            other => Err(load_error(
                path,
                format!("expected an object of symbols, found {}", describe(&other)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_object() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"MOV_FILE_PATHS": ["/a.mov"], "OTHER": 1}"#);

        let unit = JsonConfigSource.load(&path).unwrap();
        assert_eq!(unit.len(), 2);
        assert_eq!(unit.get("MOV_FILE_PATHS"), Some(&serde_json::json!(["/a.mov"])));
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"MOV_FILE_PATHS": ["/a.mov",}"#);

        assert!(matches!(JsonConfigSource.load(&path), Err(ConfigError::Load { .. })));
    }

    #[test]
    fn test_non_object_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"["/a.mov"]"#);

        match JsonConfigSource.load(&path) {
            Err(ConfigError::Load { reason, .. }) => assert!(reason.contains("a list")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
