//! # mov2gif - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Composizione dei componenti e avvio della conversione
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (config, fps, quality, workers, etc.)
//! 2. Configura il logging (stderr + file giornaliero in `logs/`)
//! 3. Crea e valida l'oggetto Config
//! 4. Istanzia lettore, motore ffmpeg, orchestratore e selettore
//! 5. Esegue l'App, salva il report e calcola l'exit code
//!
//! ## Esempio di utilizzo:
//! ```bash
//! mov2gif --config videos.json --fps 12 --workers 2 --report report.json
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use mov2gif::{
    logging::{init_logging, LogConfig},
    App, BatchOrchestrator, Config, ConfigReader, DialogSelector, FfmpegEngine, LogSink,
    OptionOverrides, ToolResolver, TracingLog,
};

#[derive(Parser)]
#[command(name = "mov2gif")]
#[command(about = "Convert the videos listed in a configuration file to animated GIF")]
struct Args {
    /// Configuration file declaring MOV_FILE_PATHS (default: config/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the configuration as `NAME = literal` assignments (config/config.py)
    #[arg(long)]
    legacy_config: bool,

    /// GIF frame rate (1-100)
    #[arg(long)]
    fps: Option<u32>,

    /// Palette quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Disable the differential frame optimization
    #[arg(long)]
    no_optimize: bool,

    /// Number of parallel conversions
    #[arg(short, long, default_value = "1")]
    workers: usize,

    /// Write the batch report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Exit with status 1 when any conversion fails
    #[arg(long)]
    fail_on_error: bool,

    /// Directory for the rolling log files (default: logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging; the guard flushes the log file on exit
    let log_dir = args.log_dir.clone().unwrap_or_else(Config::default_log_dir);
    let _guard = init_logging(&LogConfig::new(&log_dir, args.verbose));

    let config = Config {
        overrides: OptionOverrides {
            fps: args.fps,
            optimize: args.no_optimize.then_some(false),
            quality: args.quality,
        },
        workers: args.workers,
        config_path: args.config,
        legacy_config: args.legacy_config,
        report_path: args.report,
        fail_on_error: args.fail_on_error,
    };
    config.validate()?;

    info!("🎬 mov2gif - convert videos to animated GIF");

    let log: Arc<dyn LogSink> = Arc::new(TracingLog);

    let resolver = ToolResolver::new();
    if let Err(e) = FfmpegEngine::check_dependencies(&resolver) {
        log.warning(&format!("{}; conversions will fail until it is installed", e));
    }

    let reader = if config.legacy_config {
        ConfigReader::legacy(log.clone())
    } else {
        ConfigReader::new(log.clone())
    };
    let orchestrator = BatchOrchestrator::new(FfmpegEngine::discover(&resolver), log.clone())
        .with_workers(config.workers)
        .with_progress(config.workers > 1);
    let selector = DialogSelector::new(log.clone());

    let mut app = App::new(reader, selector, orchestrator, log.clone())
        .with_config_path(config.config_path.clone())
        .with_overrides(config.overrides);

    let report = app.run().await;

    if let (Some(report), Some(path)) = (&report, &config.report_path) {
        match report.save_to_file(path).await {
            Ok(()) => info!("📄 Report written to {}", path.display()),
            Err(e) => log.error(&format!("{:#}", e)),
        }
    }

    info!("🏁 mov2gif finished");

    let failed = report.as_ref().is_some_and(|r| r.has_failures());
    if config.fail_on_error && failed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
