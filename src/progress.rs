//! # Progress Tracking Module
//!
//! Barra di avanzamento del batch con `indicatif`.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:42] [========================>---------------] 3/5 (60%) ✅ clip.mov
//! ```
//!
//! `indicatif` nasconde automaticamente la barra quando stderr non è un
//! terminale, quindi l'output nei log resta pulito.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a conversion batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts() {
        let progress = ProgressManager::hidden();
        progress.update("a.mov");
        progress.update("b.mov");
        progress.finish("2/2 succeeded");
        assert_eq!(progress.position(), 2);
    }
}
