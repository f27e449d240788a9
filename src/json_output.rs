//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per i chiamanti
//! programmatici (un front end grafico che lancia la CLI, script, ...).
//!
//! ## Responsabilità:
//! - Emette una riga JSON su stdout per ogni evento del run
//! - Fornisce interfaccia standardizzata per comunicazione inter-processo
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio run (directory di output, numero file, configurazione)
//! - `progress`: Fine di un batch con il progresso cumulativo
//! - `file_failed`: Un file non è stato compresso
//! - `complete`: Fine run con statistiche finali
//! - `error`: Errore che impedisce l'avvio del run

use crate::config::{CollisionPolicy, Config};
use crate::progress::{BatchProgress, BatchReport, CompressionFailure};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del run
    #[serde(rename = "start")]
    Start {
        output_dir: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Fine di un batch
    #[serde(rename = "progress")]
    Progress {
        batch: usize,
        current: usize,
        total: usize,
        percentage: u8,
    },

    /// File non compresso
    #[serde(rename = "file_failed")]
    FileFailed {
        path: PathBuf,
        output: Option<PathBuf>,
        error: String,
    },

    /// Run completato
    #[serde(rename = "complete")]
    Complete {
        files_processed: usize,
        files_compressed: usize,
        errors: usize,
        collisions: usize,
        cancelled: bool,
        total_bytes_saved: u64,
        average_reduction: f64,
        duration_seconds: f64,
    },

    /// Errore generale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JsonConfig {
    pub quality: u8,
    pub suffix: String,
    pub collision_policy: CollisionPolicy,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(output_dir: PathBuf, total_files: usize, config: JsonConfig) -> Self {
        Self::Start {
            output_dir,
            total_files,
            config,
        }
    }

    pub fn progress(progress: &BatchProgress) -> Self {
        Self::Progress {
            batch: progress.batch_index,
            current: progress.completed,
            total: progress.total,
            percentage: progress.percent,
        }
    }

    pub fn file_failed(failure: &CompressionFailure) -> Self {
        Self::FileFailed {
            path: failure.input.clone(),
            output: failure.output.clone(),
            error: failure.message.clone(),
        }
    }

    pub fn complete(report: &BatchReport) -> Self {
        Self::Complete {
            files_processed: report.stats.files_processed,
            files_compressed: report.stats.files_compressed,
            errors: report.stats.errors,
            collisions: report.collisions.len(),
            cancelled: report.cancelled,
            total_bytes_saved: report.stats.bytes_saved(),
            average_reduction: report.stats.overall_reduction_percent(),
            duration_seconds: report.duration.as_secs_f64(),
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

/// Converti Config esistente in JsonConfig
impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            quality: config.quality,
            suffix: config.suffix.clone(),
            collision_policy: config.collision_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_progress_message_shape() {
        let message = JsonMessage::progress(&BatchProgress::new(1, 20, 40));
        let value: Value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "progress");
        assert_eq!(value["current"], 20);
        assert_eq!(value["percentage"], 50);
    }

    #[test]
    fn test_start_message_carries_config() {
        let message = JsonMessage::start(PathBuf::from("/out"), 3, JsonConfig::from(&Config::default()));
        let json = serde_json::to_string(&message).unwrap();
        let parsed: JsonMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, message);
        assert!(json.contains(r#""collision_policy":"overwrite""#));
    }

    #[test]
    fn test_complete_message_from_report() {
        let mut report = BatchReport {
            total: 2,
            ..Default::default()
        };
        report.stats.add_compressed(100, 40);
        report.stats.add_error();

        match JsonMessage::complete(&report) {
            JsonMessage::Complete {
                files_processed,
                errors,
                total_bytes_saved,
                ..
            } => {
                assert_eq!(files_processed, 2);
                assert_eq!(errors, 1);
                assert_eq!(total_bytes_saved, 60);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }
}
