//! # Application Module
//!
//! Flusso principale di un'esecuzione:
//! 1. Legge percorsi e opzioni dal file di configurazione
//! 2. Applica le opzioni esplicite da riga di comando
//! 3. Converte tutti i percorsi configurati, oppure chiede un singolo file
//!    al selettore quando la lista è vuota
//! 4. Stampa l'esito di ogni conversione

use crate::{
    config::OptionOverrides,
    config_reader::ConfigReader,
    engine::ConversionEngine,
    logging::LogSink,
    orchestrator::BatchOrchestrator,
    report::BatchReport,
    selector::FileSelector,
};
use std::path::PathBuf;
use std::sync::Arc;

pub struct App<E: ConversionEngine, S: FileSelector> {
    reader: ConfigReader,
    selector: S,
    orchestrator: BatchOrchestrator<E>,
    config_path: Option<PathBuf>,
    overrides: OptionOverrides,
    log: Arc<dyn LogSink>,
}

impl<E: ConversionEngine, S: FileSelector> App<E, S> {
    pub fn new(
        reader: ConfigReader,
        selector: S,
        orchestrator: BatchOrchestrator<E>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            reader,
            selector,
            orchestrator,
            config_path: None,
            overrides: OptionOverrides::default(),
            log,
        }
    }

    /// Configuration file to read instead of the default location
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_overrides(mut self, overrides: OptionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator<E> {
        &self.orchestrator
    }

    /// Run once; `None` when nothing was configured and no file was chosen
    pub async fn run(&mut self) -> Option<BatchReport> {
        let loaded = self.reader.load(self.config_path.as_deref());

        let options = self.overrides.apply(loaded.options.unwrap_or_default());
        self.log.debug(&format!(
            "Conversion options: fps={} quality={} optimize={}",
            options.fps, options.quality, options.optimize
        ));
        self.orchestrator.set_options(options);

        let inputs = if loaded.paths.is_empty() {
            self.log.info("No files configured, opening file selection");
            let selected = self.selector.prompt();
            if selected.is_empty() {
                self.log.info("File selection cancelled");
                return None;
            }
            vec![selected]
        } else {
            loaded.paths
        };

        let report = self.orchestrator.batch_convert(&inputs).await;
        self.print_outcomes(&report);
        Some(report)
    }

    fn print_outcomes(&self, report: &BatchReport) {
        for outcome in report.iter() {
            if outcome.success() {
                self.log.info(&format!(
                    "✅ Converted: {} -> {}",
                    outcome.input,
                    outcome.output.display()
                ));
            } else {
                self.log.error(&format!("❌ Failed: {}", outcome.input));
            }
        }
    }
}
