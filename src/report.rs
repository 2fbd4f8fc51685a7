//! # Batch Report Module
//!
//! Tipi risultato di una conversione e del batch.
//!
//! ## Responsabilità:
//! - `ConversionOutcome`: esito di un singolo file (successo o errore con motivo)
//! - `BatchReport`: mappa ordinata input → esito con conteggi derivati
//! - Export JSON del report (`--report`)
//!
//! ## Chiavi duplicate:
//! Un input ripetuto sovrascrive l'esito precedente mantenendo la posizione
//! del primo inserimento; `attempted` conta comunque ogni input ricevuto.
//!
//! ## Esempio struttura report:
//! ```json
//! {
//!   "attempted": 2,
//!   "succeeded": 1,
//!   "failed": 1,
//!   "outcomes": [
//!     { "input": "m1.mov", "output": "m1.gif", "success": true },
//!     { "input": "m2.mov", "output": "m2.gif", "success": false, "error": "FFmpeg error: ..." }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Result of converting one target
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub input: String,
    pub output: PathBuf,
    /// Diagnostic of a failed conversion
    pub error: Option<String>,
}

impl ConversionOutcome {
    pub fn succeeded(input: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(input: impl Into<String>, output: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            error: Some(error.to_string()),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

impl Serialize for ConversionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            input: &'a str,
            output: &'a Path,
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Entry {
            input: &self.input,
            output: &self.output,
            success: self.success(),
            error: self.error.as_deref(),
        }
        .serialize(serializer)
    }
}

/// Ordered mapping input path → outcome for one batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    outcomes: Vec<ConversionOutcome>,
    index: HashMap<String, usize>,
    attempted: usize,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome; returns `true` when it replaced one for the same input
    pub fn record(&mut self, outcome: ConversionOutcome) -> bool {
        self.attempted += 1;

        match self.index.get(&outcome.input) {
            Some(&slot) => {
                self.outcomes[slot] = outcome;
                true
            }
            None => {
                self.index.insert(outcome.input.clone(), self.outcomes.len());
                self.outcomes.push(outcome);
                false
            }
        }
    }

    pub fn get(&self, input: &str) -> Option<&ConversionOutcome> {
        self.index.get(input).map(|&slot| &self.outcomes[slot])
    }

    /// Success flag recorded for `input`
    pub fn is_success(&self, input: &str) -> Option<bool> {
        self.get(input).map(ConversionOutcome::success)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter()
    }

    /// `(input, success)` pairs in insertion order
    pub fn results(&self) -> Vec<(&str, bool)> {
        self.outcomes
            .iter()
            .map(|o| (o.input.as_str(), o.success()))
            .collect()
    }

    /// Distinct inputs in the report
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Inputs submitted, duplicates included
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn summary(&self) -> String {
        format!("{}/{} succeeded", self.succeeded(), self.attempted())
    }

    /// Save the report as pretty JSON
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ReportFile<'a> {
            attempted: usize,
            succeeded: usize,
            failed: usize,
            outcomes: &'a [ConversionOutcome],
        }

        ReportFile {
            attempted: self.attempted,
            succeeded: self.succeeded(),
            failed: self.failed(),
            outcomes: &self.outcomes,
        }
        .serialize(serializer)
    }
}
