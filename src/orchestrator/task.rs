//! # Task Module
//!
//! Conversione di un singolo file. Ogni errore del motore viene catturato
//! qui e trasformato in un `ConversionOutcome` fallito, mai propagato.

use crate::{
    config::ConversionOptions,
    engine::ConversionEngine,
    error::ConversionError,
    file_manager::FileManager,
    logging::LogSink,
    orchestrator::path_resolver::PathResolver,
    report::ConversionOutcome,
};
use std::path::Path;

/// Convert one input, deriving the output path when none is given
pub fn convert_one<E: ConversionEngine + ?Sized>(
    engine: &E,
    log: &dyn LogSink,
    input: &str,
    output: Option<&Path>,
    options: &ConversionOptions,
) -> ConversionOutcome {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathResolver::output_path(input));

    log.info(&format!("Conversion started: {} -> {}", input, output.display()));

    match run_engine(engine, Path::new(input), &output, options) {
        Ok(()) => {
            let size = FileManager::file_size(&output)
                .map(|s| format!(" ({})", FileManager::format_size(s)))
                .unwrap_or_default();
            log.info(&format!("Conversion complete: {}{}", output.display(), size));
            ConversionOutcome::succeeded(input, output)
        }
        Err(e) => {
            log.error(&format!("Conversion failed for {}: {}", input, e));
            ConversionOutcome::failed(input, output, e)
        }
    }
}

/// open → encode → release; release runs even when encode fails or panics
fn run_engine<E: ConversionEngine + ?Sized>(
    engine: &E,
    input: &Path,
    output: &Path,
    options: &ConversionOptions,
) -> Result<(), ConversionError> {
    let mut opened = OpenedInput::open(engine, input)?;
    opened.encode(output, options)
}

/// Engine handle released exactly once, on drop
struct OpenedInput<'a, E: ConversionEngine + ?Sized> {
    engine: &'a E,
    handle: Option<E::Handle>,
}

impl<'a, E: ConversionEngine + ?Sized> OpenedInput<'a, E> {
    fn open(engine: &'a E, input: &Path) -> Result<Self, ConversionError> {
        Ok(Self {
            engine,
            handle: Some(engine.open(input)?),
        })
    }

    fn encode(&mut self, output: &Path, options: &ConversionOptions) -> Result<(), ConversionError> {
        match self.handle.as_mut() {
            Some(handle) => self.engine.encode(handle, output, options),
            None => Ok(()),
        }
    }
}

impl<'a, E: ConversionEngine + ?Sized> Drop for OpenedInput<'a, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.engine.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::MockEngine;
    use crate::logging::{testing::RecordingLog, LogLevel};
    use std::path::PathBuf;

    #[test]
    fn test_success_logs_start_and_complete() {
        let engine = MockEngine::new();
        let log = RecordingLog::default();

        let outcome = convert_one(&engine, &log, "/a/b/movie.mov", None, &ConversionOptions::default());

        assert!(outcome.success());
        assert_eq!(outcome.output, PathBuf::from("/a/b/movie.gif"));
        assert_eq!(
            log.messages(LogLevel::Info),
            vec![
                "Conversion started: /a/b/movie.mov -> /a/b/movie.gif".to_string(),
                "Conversion complete: /a/b/movie.gif".to_string(),
            ]
        );
        assert_eq!(log.count(LogLevel::Error), 0);
        assert_eq!(engine.released(), 1);
    }

    #[test]
    fn test_explicit_output_and_options_are_passed_through() {
        let engine = MockEngine::new();
        let log = RecordingLog::default();
        let options = ConversionOptions {
            fps: 24,
            optimize: false,
            quality: 55,
        };

        let outcome = convert_one(&engine, &log, "in.mov", Some(Path::new("/out/x.gif")), &options);

        assert!(outcome.success());
        assert_eq!(
            engine.encoded(),
            vec![("in.mov".to_string(), PathBuf::from("/out/x.gif"), options)]
        );
    }

    #[test]
    fn test_encode_failure_is_contained_and_released() {
        let engine = MockEngine::new().failing_on("bad.mov");
        let log = RecordingLog::default();

        let outcome = convert_one(&engine, &log, "bad.mov", None, &ConversionOptions::default());

        assert!(!outcome.success());
        assert_eq!(outcome.error.as_deref(), Some("FFmpeg error: cannot encode bad.mov"));
        assert_eq!(engine.released(), 1);

        let errors = log.messages(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("cannot encode bad.mov"));
        // no completion message on failure
        assert_eq!(log.messages(LogLevel::Info).len(), 1);
    }

    #[test]
    fn test_open_failure_skips_encode() {
        let engine = MockEngine::new().failing_open("missing.mov");
        let log = RecordingLog::default();

        let outcome = convert_one(&engine, &log, "missing.mov", None, &ConversionOptions::default());

        assert!(!outcome.success());
        assert!(engine.encoded().is_empty());
        assert_eq!(engine.released(), 0);
        assert_eq!(log.count(LogLevel::Error), 1);
    }

    #[test]
    fn test_panicking_encode_still_releases() {
        let engine = MockEngine::new().panicking_on("crash.mov");
        let log = RecordingLog::default();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            convert_one(&engine, &log, "crash.mov", None, &ConversionOptions::default())
        }));

        assert!(result.is_err());
        assert_eq!(engine.opened(), vec!["crash.mov"]);
        assert_eq!(engine.released(), 1);
    }
}
