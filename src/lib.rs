//! # mov2gif Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Opzioni di conversione, parametri di sessione e validazione
//! - `config_source`: Formati del file di configurazione (JSON, legacy)
//! - `config_reader`: Lettura e validazione di `MOV_FILE_PATHS`
//! - `engine`: Trait del motore di conversione e implementazione ffmpeg
//! - `tool_resolver`: Ricerca degli eseguibili `ffmpeg`/`ffprobe`
//! - `orchestrator`: Conversione singola e batch con isolamento errori
//! - `report`: Esiti per file e riepilogo del batch
//! - `selector`: Selezione interattiva di un file da terminale
//! - `app`: Flusso configurazione → batch, oppure selezione → file singolo
//! - `logging`: Sink di logging e inizializzazione di `tracing`
//! - `file_manager`, `progress`, `utils`: supporto
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use mov2gif::{BatchOrchestrator, FfmpegEngine, ToolResolver, TracingLog};
//!
//! let engine = FfmpegEngine::discover(&ToolResolver::new());
//! let orchestrator = BatchOrchestrator::new(engine, Arc::new(TracingLog));
//! let report = orchestrator.batch_convert(&paths).await;
//! ```

pub mod app;
pub mod config;
pub mod config_reader;
pub mod config_source;
pub mod engine;
pub mod error;
pub mod file_manager;
pub mod logging;
pub mod orchestrator;
pub mod progress;
pub mod report;
pub mod selector;
pub mod tool_resolver;
pub mod utils;

pub use app::App;
pub use config::{Config, ConversionOptions, OptionOverrides};
pub use config_reader::{ConfigReader, LoadedConfig};
pub use engine::{ConversionEngine, FfmpegEngine};
pub use error::{ConfigError, ConversionError};
pub use logging::{LogLevel, LogSink, TracingLog};
pub use orchestrator::BatchOrchestrator;
pub use report::{BatchReport, ConversionOutcome};
pub use selector::{DialogSelector, FileSelector};
pub use tool_resolver::ToolResolver;
