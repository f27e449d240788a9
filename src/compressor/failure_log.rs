//! # Failure Log Module
//!
//! Collaboratore di logging per i fallimenti per singola immagine.
//! Il sink di default scrive tramite `tracing` a livello ERROR, quindi finisce
//! anche nel file di log degli errori se configurato.

use std::path::Path;
use tracing::error;

/// Write-only sink for `(path, message)` pairs of failed compressions
pub trait FailureLog: Send + Sync {
    fn record(&self, path: &Path, message: &str);
}

/// Sink di default: un evento `tracing::error!` per fallimento
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureLog;

impl FailureLog for TracingFailureLog {
    fn record(&self, path: &Path, message: &str) {
        error!(path = %path.display(), "Error compressing image: {}: {}", path.display(), message);
    }
}
