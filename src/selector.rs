//! # File Selector Module
//!
//! Selezione interattiva di un singolo video quando la configurazione non
//! fornisce alcun percorso.
//!
//! ## Responsabilità:
//! - Mostra i video della directory di partenza (cwd, oppure la home)
//! - Permette di digitare un percorso a mano o di annullare
//! - Restituisce una stringa vuota se l'utente annulla o se non c'è un
//!   terminale interattivo (es. esecuzione in pipeline o cron)
//!
//! L'annullamento non viene loggato qui: lo registra `App` una sola volta.

use crate::{file_manager::FileManager, logging::LogSink};
use anyhow::Result;
use dialoguer::{Input, Select};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Asks the user for one input file; an empty string means "nothing chosen"
pub trait FileSelector: Send + Sync {
    fn prompt(&self) -> String;
}

const MANUAL_ENTRY: &str = "Enter a path…";
const CANCEL_ENTRY: &str = "Cancel";

/// What the user picked from the menu
#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    File(PathBuf),
    Manual,
    Cancel,
}

/// Terminal menu backed by `dialoguer`
pub struct DialogSelector {
    start_dir: PathBuf,
    log: Arc<dyn LogSink>,
}

impl DialogSelector {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        let start_dir = std::env::current_dir()
            .ok()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_start_dir(start_dir, log)
    }

    pub fn with_start_dir(start_dir: impl Into<PathBuf>, log: Arc<dyn LogSink>) -> Self {
        Self {
            start_dir: start_dir.into(),
            log,
        }
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    fn ask(&self) -> Result<Option<String>> {
        let files = FileManager::find_video_files(&self.start_dir);
        let entries = menu_entries(&files, &self.start_dir);

        let selection = Select::new()
            .with_prompt(format!("Select a video to convert ({})", self.start_dir.display()))
            .items(&entries)
            .default(0)
            .interact_opt()?;

        match resolve_choice(&files, selection) {
            Choice::File(path) => Ok(Some(path.to_string_lossy().into_owned())),
            Choice::Manual => {
                let typed: String = Input::new()
                    .with_prompt("Video path")
                    .allow_empty(true)
                    .interact_text()?;
                let typed = typed.trim();
                Ok((!typed.is_empty()).then(|| typed.to_string()))
            }
            Choice::Cancel => Ok(None),
        }
    }
}

impl FileSelector for DialogSelector {
    fn prompt(&self) -> String {
        if !std::io::stdin().is_terminal() {
            self.log.info("No interactive terminal available, skipping file selection");
            return String::new();
        }

        match self.ask() {
            Ok(Some(path)) => {
                self.log.info(&format!("File selected: {}", path));
                path
            }
            Ok(None) => String::new(),
            Err(e) => {
                self.log.error(&format!("File selection failed: {:#}", e));
                String::new()
            }
        }
    }
}

/// Menu labels: one per video, then the manual entry and cancel
fn menu_entries(files: &[PathBuf], start_dir: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| f.strip_prefix(start_dir).unwrap_or(f).display().to_string())
        .chain([MANUAL_ENTRY.to_string(), CANCEL_ENTRY.to_string()])
        .collect()
}

fn resolve_choice(files: &[PathBuf], selection: Option<usize>) -> Choice {
    match selection {
        Some(i) if i < files.len() => Choice::File(files[i].clone()),
        Some(i) if i == files.len() => Choice::Manual,
        _ => Choice::Cancel,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::FileSelector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned answer and counts how often it was asked
    #[derive(Default)]
    pub struct FixedSelector {
        answer: String,
        calls: AtomicUsize,
    }

    impl FixedSelector {
        pub fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FileSelector for FixedSelector {
        fn prompt(&self) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }
}
