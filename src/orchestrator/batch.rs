//! # Batch Orchestrator Module
//!
//! Orchestratore principale della conversione di una lista di file.
//!
//! ## Responsabilità:
//! - Converte ogni input esattamente una volta, nell'ordine ricevuto
//! - Isola i fallimenti: un input non valido non interrompe il batch
//! - Costruisce il `BatchReport` e logga il riepilogo finale
//!
//! ## Gestione concorrenza:
//! - Semaforo con `workers` permessi (default: 1 = strettamente sequenziale)
//! - Ogni conversione gira su `spawn_blocking` (ffmpeg è bloccante)
//! - Gli esiti vengono raccolti per indice e uniti nell'ordine di input
//!   solo dopo il completamento di tutti i task
//!
//! ## Esempio:
//! ```rust,ignore
//! let orchestrator = BatchOrchestrator::new(engine, log).with_workers(4);
//! let report = orchestrator.batch_convert(&paths).await;
//! println!("{}", report.summary());
//! ```

use crate::{
    config::ConversionOptions,
    engine::ConversionEngine,
    error::ConversionError,
    logging::LogSink,
    orchestrator::{path_resolver::PathResolver, task},
    progress::ProgressManager,
    report::{BatchReport, ConversionOutcome},
};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Drives a conversion engine over a list of inputs
pub struct BatchOrchestrator<E: ConversionEngine> {
    engine: Arc<E>,
    log: Arc<dyn LogSink>,
    options: ConversionOptions,
    workers: usize,
    show_progress: bool,
}

impl<E: ConversionEngine> BatchOrchestrator<E> {
    pub fn new(engine: E, log: Arc<dyn LogSink>) -> Self {
        Self {
            engine: Arc::new(engine),
            log,
            options: ConversionOptions::default(),
            workers: 1,
            show_progress: false,
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_options(&mut self, options: ConversionOptions) {
        self.options = options;
    }

    /// Maximum number of conversions running at once (at least 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert a single input; never fails, the outcome carries the error
    pub fn convert_one(&self, input: &str, output: Option<&Path>) -> ConversionOutcome {
        task::convert_one(&*self.engine, &*self.log, input, output, &self.options)
    }

    /// Convert every input and collect the outcomes keyed by input path
    pub async fn batch_convert(&self, inputs: &[String]) -> BatchReport {
        if inputs.is_empty() {
            self.log.warning("No files specified for conversion");
            return BatchReport::new();
        }

        self.log.info(&format!("Starting conversion of {} file(s)", inputs.len()));

        let progress = if self.show_progress {
            ProgressManager::new(inputs.len() as u64)
        } else {
            ProgressManager::hidden()
        };

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(inputs.len());

        for input in inputs {
            // Acquired before spawning: with one permit the next item only
            // starts once the previous one has finished.
            let permit = Arc::clone(&semaphore).acquire_owned().await.ok();

            let engine = Arc::clone(&self.engine);
            let log = Arc::clone(&self.log);
            let progress = progress.clone();
            let options = self.options;
            let input = input.clone();

            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let outcome = task::convert_one(&*engine, &*log, &input, None, &options);
                let mark = if outcome.success() { "✅" } else { "❌" };
                progress.update(&format!("{} {}", mark, input));
                outcome
            }));
        }

        let results = join_all(tasks).await;

        let mut report = BatchReport::new();
        for (input, result) in inputs.iter().zip(results) {
            let outcome = result.unwrap_or_else(|e| {
                let error = ConversionError::Aborted(e.to_string());
                self.log.error(&format!("Conversion failed for {}: {}", input, error));
                ConversionOutcome::failed(input.as_str(), PathResolver::output_path(input), error)
            });

            if report.record(outcome) {
                self.log.warning(&format!(
                    "Duplicate input {}: keeping the outcome of the last conversion",
                    input
                ));
            }
        }

        progress.finish(&report.summary());
        self.log.info(&format!("Conversion finished: {}", report.summary()));

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::MockEngine;
    use crate::logging::{testing::RecordingLog, LogLevel};
    use std::collections::HashSet;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn setup(engine: MockEngine) -> (BatchOrchestrator<MockEngine>, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        (BatchOrchestrator::new(engine, log.clone()), log)
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (orchestrator, log) = setup(MockEngine::new());

        let report = orchestrator.batch_convert(&[]).await;

        assert!(report.is_empty());
        assert_eq!(log.count(LogLevel::Warning), 1);
        assert!(orchestrator.engine().opened().is_empty());
    }

    #[tokio::test]
    async fn test_all_succeed_in_input_order() {
        let (orchestrator, log) = setup(MockEngine::new());
        let inputs = paths(&["c.mov", "a.mov", "b.mov", "d.mp4"]);

        let report = orchestrator.batch_convert(&inputs).await;

        assert_eq!(report.len(), 4);
        assert!(report.iter().all(|o| o.success()));
        assert_eq!(orchestrator.engine().opened(), inputs);
        assert_eq!(orchestrator.engine().released(), 4);
        assert_eq!(log.count(LogLevel::Warning), 0);
        assert!(log
            .messages(LogLevel::Info)
            .contains(&"Conversion finished: 4/4 succeeded".to_string()));
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        let inputs = paths(&["a.mov", "b.mov", "c.mov", "d.mov"]);
        let (orchestrator, log) = setup(MockEngine::new().failing_on("c.mov"));

        let report = orchestrator.batch_convert(&inputs).await;

        assert_eq!(
            report.results(),
            vec![("a.mov", true), ("b.mov", true), ("c.mov", false), ("d.mov", true)]
        );
        assert_eq!(report.succeeded(), 3);
        assert_eq!(orchestrator.engine().opened(), inputs);
        assert!(log
            .messages(LogLevel::Info)
            .contains(&"Conversion finished: 3/4 succeeded".to_string()));
    }

    #[tokio::test]
    async fn test_summary_is_last_message() {
        let (orchestrator, log) = setup(MockEngine::new().failing_on("m2.mov"));

        orchestrator.batch_convert(&paths(&["m1.mov", "m2.mov"])).await;

        let entries = log.entries();
        assert_eq!(entries[0], (LogLevel::Info, "Starting conversion of 2 file(s)".to_string()));
        assert_eq!(
            entries.last(),
            Some(&(LogLevel::Info, "Conversion finished: 1/2 succeeded".to_string()))
        );
    }

    #[tokio::test]
    async fn test_duplicates_are_converted_each_time() {
        let (orchestrator, log) = setup(MockEngine::new());
        let inputs = paths(&["a.mov", "b.mov", "a.mov"]);

        let report = orchestrator.batch_convert(&inputs).await;

        assert_eq!(orchestrator.engine().opened().len(), 3);
        assert_eq!(report.len(), 2);
        assert_eq!(report.attempted(), 3);
        assert_eq!(log.count(LogLevel::Warning), 1);
        assert!(log
            .messages(LogLevel::Info)
            .contains(&"Conversion finished: 2/3 succeeded".to_string()));
    }

    #[tokio::test]
    async fn test_options_reach_engine() {
        let options = ConversionOptions {
            fps: 8,
            optimize: false,
            quality: 40,
        };
        let (orchestrator, _log) = setup(MockEngine::new());
        let orchestrator = orchestrator.with_options(options);

        orchestrator.batch_convert(&paths(&["x.mov"])).await;

        let encoded = orchestrator.engine().encoded();
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0].2, options);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_parallel_batch_keeps_order_and_isolation() {
        let inputs: Vec<String> = (0..12).map(|i| format!("clip{:02}.mov", i)).collect();
        let (orchestrator, _log) = setup(MockEngine::new().failing_on("clip05.mov"));
        let orchestrator = orchestrator.with_workers(4);

        let report = orchestrator.batch_convert(&inputs).await;

        let keys: Vec<&str> = report.iter().map(|o| o.input.as_str()).collect();
        assert_eq!(keys, inputs.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(report.succeeded(), 11);
        assert_eq!(report.is_success("clip05.mov"), Some(false));

        let opened: HashSet<String> = orchestrator.engine().opened().into_iter().collect();
        assert_eq!(opened.len(), 12);
        assert_eq!(orchestrator.engine().released(), 12);
    }

    #[tokio::test]
    async fn test_engine_panic_is_contained() {
        let (orchestrator, log) = setup(MockEngine::new().panicking_on("b.mov"));

        let report = orchestrator
            .batch_convert(&paths(&["a.mov", "b.mov", "c.mov"]))
            .await;

        assert_eq!(
            report.results(),
            vec![("a.mov", true), ("b.mov", false), ("c.mov", true)]
        );
        assert!(report
            .get("b.mov")
            .and_then(|o| o.error.as_deref())
            .is_some_and(|e| e.starts_with("Conversion task aborted")));
        assert_eq!(log.count(LogLevel::Error), 1);
        assert_eq!(orchestrator.engine().released(), 3);
    }

    #[test]
    fn test_convert_one_direct() {
        let (orchestrator, _log) = setup(MockEngine::new().failing_on("bad.mov"));

        assert!(orchestrator.convert_one("good.mov", None).success());
        assert!(!orchestrator.convert_one("bad.mov", None).success());
    }

    #[test]
    fn test_workers_never_zero() {
        let (orchestrator, _log) = setup(MockEngine::new());
        assert_eq!(orchestrator.with_workers(0).workers, 1);
    }
}
