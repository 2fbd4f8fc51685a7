//! # Path Resolution Module
//!
//! Calcola il path di output di una conversione quando non è indicato.
//! La sostituzione dell'estensione è puramente lessicale sull'ultimo
//! componente del path, il contenuto del file non viene esaminato.

use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Extension of the produced animated image
    pub const OUTPUT_EXTENSION: &'static str = "gif";

    /// Same path as `input` with its extension replaced by `.gif`
    pub fn output_path(input: &str) -> PathBuf {
        Path::new(input).with_extension(Self::OUTPUT_EXTENSION)
    }
}
