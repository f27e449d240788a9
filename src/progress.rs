//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce gli eventi di progresso del batch, la progress bar
//! e le statistiche di compressione.
//!
//! ## Responsabilità:
//! - `ProgressEvent`: eventi emessi dal batch (fine di ogni batch + completamento)
//! - `BatchReport`: esito completo di un run, inclusa la lista dei fallimenti
//! - `ProgressManager`: progress bar visual con `indicatif`
//! - `BatchStats`: statistiche cumulative (file, errori, byte risparmiati)
//!
//! ## Calcolo del progresso:
//! Dopo ogni batch da `BATCH_SIZE` file:
//! `percent = completati * 100 / totale` (troncamento intero).
//! L'ultimo evento di un run completo vale sempre esattamente 100.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:04] [========================>---------------] 20/33 (60%) batch 2
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Progress after a completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// Zero-based index of the batch just completed
    pub batch_index: usize,
    /// Items processed so far, failures included
    pub completed: usize,
    pub total: usize,
    /// `completed * 100 / total`, truncated
    pub percent: u8,
}

impl BatchProgress {
    pub fn new(batch_index: usize, completed: usize, total: usize) -> Self {
        let percent = if total > 0 {
            (completed.min(total) * 100 / total) as u8
        } else {
            0
        };

        Self {
            batch_index,
            completed,
            total,
            percent,
        }
    }

    /// Same value as a fraction in `[0.0, 1.0]`
    pub fn fraction(&self) -> f64 {
        if self.total > 0 {
            self.completed as f64 / self.total as f64
        } else {
            0.0
        }
    }
}

/// A single item that could not be compressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionFailure {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub message: String,
}

/// Outcome of one compression run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    /// Files written, in input order
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<CompressionFailure>,
    /// Output paths that more than one input mapped to
    pub collisions: Vec<PathBuf>,
    pub cancelled: bool,
    pub stats: BatchStats,
    pub duration: Duration,
}

impl BatchReport {
    /// Items attempted, succeeded or failed
    pub fn processed(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Events emitted by a compression run, in order
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A batch finished
    Batch(BatchProgress),
    /// The run is over; always the last event
    Done(BatchReport),
}

/// Manages progress reporting for a compression run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Move the bar to the batch boundary
    pub fn update(&self, progress: &BatchProgress) {
        self.bar.set_position(progress.completed as u64);
        self.bar.set_message(format!("batch {}", progress.batch_index + 1));
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Stop drawing, leaving the bar where it is
    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

/// Statistics tracker for compression results
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub files_processed: usize,
    pub files_compressed: usize,
    pub errors: usize,
    pub total_original_size: u64,
    pub total_compressed_size: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compressed(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_compressed += 1;
        self.total_original_size += original_size;
        self.total_compressed_size += new_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_original_size.saturating_sub(self.total_compressed_size)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_size, self.total_compressed_size)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Compressed: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_compressed,
            self.errors,
            FileManager::format_size(self.bytes_saved()),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(BatchProgress::new(0, 10, 33).percent, 30);
        assert_eq!(BatchProgress::new(1, 20, 33).percent, 60);
        assert_eq!(BatchProgress::new(3, 33, 33).percent, 100);
        assert_eq!(BatchProgress::new(0, 0, 0).percent, 0);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(BatchProgress::new(0, 5, 20).fraction(), 0.25);
    }

    #[test]
    fn test_stats_summary() {
        let mut stats = BatchStats::new();
        stats.add_compressed(1000, 400);
        stats.add_compressed(1000, 600);
        stats.add_error();

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_compressed, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.bytes_saved(), 1000);
        assert_eq!(stats.overall_reduction_percent(), 50.0);
        assert!(stats.format_summary().contains("Errors: 1"));
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            total: 3,
            outputs: vec![PathBuf::from("a"), PathBuf::from("b")],
            failures: vec![CompressionFailure {
                input: PathBuf::from("c"),
                output: None,
                message: "boom".into(),
            }],
            ..Default::default()
        };
        assert_eq!(report.processed(), 3);
        assert!(!report.is_success());
    }
}
