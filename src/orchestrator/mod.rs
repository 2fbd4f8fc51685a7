//! # Orchestrator Module
//!
//! Separa le responsabilità della conversione in sottomoduli:
//! - `batch`: orchestratore del batch (sequenziale o con pool limitato)
//! - `task`: conversione di un singolo file con isolamento degli errori
//! - `path_resolver`: calcolo deterministico del path di output

pub mod batch;
pub mod path_resolver;
pub mod task;

pub use batch::BatchOrchestrator;
pub use path_resolver::PathResolver;
pub use task::convert_one;
