//! # Compressor Module
//!
//! Separa le responsabilità in sottomoduli:
//! - `batch_compressor`: Il loop a blocchi, come iteratore lazy di eventi
//! - `path_resolver`: Logica di calcolo path centralizzata
//! - `failure_log`: Collaboratore di logging per i file falliti
//! - `worker`: Worker in background con canale di progresso

pub mod batch_compressor;
pub mod failure_log;
pub mod path_resolver;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_mocks;

pub use batch_compressor::{BatchCompressor, BatchRun, CompressionJob, BATCH_SIZE};
pub use failure_log::{FailureLog, TracingFailureLog};
pub use path_resolver::{OutputPlanner, PathResolver};
pub use worker::{CompressionHandle, CompressionWorker};
