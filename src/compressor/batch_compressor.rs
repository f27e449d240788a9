//! # Batch Compressor Module
//!
//! Il cuore della libreria: comprime una lista ordinata di immagini in una
//! directory di output, a blocchi di `BATCH_SIZE` file.
//!
//! ## Algoritmo:
//! 1. Divide gli input in blocchi consecutivi da `BATCH_SIZE` (l'ultimo può
//!    essere più piccolo), preservando l'ordine
//! 2. Per ogni file del blocco calcola il path di output e invoca il codec
//! 3. A fine blocco emette `ProgressEvent::Batch` con il progresso cumulativo
//! 4. A fine run emette `ProgressEvent::Done` con il `BatchReport`
//!
//! ## Gestione errori:
//! Ogni fallimento (file illeggibile, formato non supportato, scrittura
//! fallita) viene loggato tramite `FailureLog`, aggiunto al report e conta
//! comunque per il progresso. Nessun retry, nessun abort del batch.
//!
//! ## Lazy:
//! `BatchRun` è un `Iterator`: ogni chiamata a `next()` elabora un blocco.
//! Il worker in background lo consuma e inoltra gli eventi su un canale.
//!
//! ## Cancellazione:
//! Opzionale e cooperativa, controllata prima di ogni file tramite
//! `broadcast::Receiver<()>`.

use crate::compressor::failure_log::{FailureLog, TracingFailureLog};
use crate::compressor::path_resolver::OutputPlanner;
use crate::config::Config;
use crate::file_manager::FileManager;
use crate::image_processor::{ImageCodec, ImageProcessor};
use crate::progress::{BatchProgress, BatchReport, CompressionFailure, ProgressEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Number of files processed between two progress events
pub const BATCH_SIZE: usize = 10;

/// One input paired with its output and quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub quality: u8,
}

/// Compresses image lists through an `ImageCodec`
#[derive(Clone)]
pub struct BatchCompressor {
    codec: Arc<dyn ImageCodec>,
    failure_log: Arc<dyn FailureLog>,
}

impl Default for BatchCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchCompressor {
    /// Compressor using the `image` crate and logging failures through `tracing`
    pub fn new() -> Self {
        Self::with_collaborators(Arc::new(ImageProcessor::new()), Arc::new(TracingFailureLog))
    }

    pub fn with_collaborators(codec: Arc<dyn ImageCodec>, failure_log: Arc<dyn FailureLog>) -> Self {
        Self { codec, failure_log }
    }

    /// Start a run. Nothing is processed until the returned iterator is polled.
    ///
    /// `output_dir` must already exist; it is never created here.
    pub fn compress(&self, inputs: Vec<PathBuf>, output_dir: &Path, config: &Config) -> BatchRun {
        let total = inputs.len();

        BatchRun {
            codec: Arc::clone(&self.codec),
            failure_log: Arc::clone(&self.failure_log),
            planner: OutputPlanner::new(
                output_dir.to_path_buf(),
                config.suffix.clone(),
                config.collision_policy,
            ),
            quality: config.quality,
            inputs,
            next_index: 0,
            batch_index: 0,
            report: BatchReport {
                total,
                ..Default::default()
            },
            started: Instant::now(),
            stop_receiver: None,
            finished: false,
        }
    }
}

/// A compression run in progress, yielding one event per batch
pub struct BatchRun {
    codec: Arc<dyn ImageCodec>,
    failure_log: Arc<dyn FailureLog>,
    planner: OutputPlanner,
    quality: u8,
    inputs: Vec<PathBuf>,
    next_index: usize,
    batch_index: usize,
    report: BatchReport,
    started: Instant,
    stop_receiver: Option<broadcast::Receiver<()>>,
    finished: bool,
}

impl BatchRun {
    /// Attach a stop signal, checked before each file
    pub fn with_cancellation(mut self, stop_receiver: broadcast::Receiver<()>) -> Self {
        self.stop_receiver = Some(stop_receiver);
        self
    }

    pub fn total(&self) -> usize {
        self.inputs.len()
    }

    /// Drive the run to the end and return its report
    pub fn finish(self) -> BatchReport {
        self.filter_map(|event| match event {
            ProgressEvent::Done(report) => Some(report),
            ProgressEvent::Batch(_) => None,
        })
        .last()
        .unwrap_or_default()
    }

    /// Controlla se è stato ricevuto un segnale di stop
    fn should_stop(&mut self) -> bool {
        if let Some(ref mut receiver) = self.stop_receiver {
            match receiver.try_recv() {
                Ok(_) => {
                    debug!("Stop signal received, cancelling compression");
                    return true;
                }
                Err(broadcast::error::TryRecvError::Empty) => return false,
                Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    debug!("Stop signal was lagged, cancelling compression");
                    return true;
                }
                Err(broadcast::error::TryRecvError::Closed) => return false,
            }
        }
        false
    }

    fn process_item(&mut self, index: usize) {
        let input = self.inputs[index].clone();

        let resolved = match self.planner.resolve(&input) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.record_failure(input, None, e.to_string());
                return;
            }
        };
        if resolved.collided {
            self.report.collisions.push(resolved.path.clone());
        }

        let job = CompressionJob {
            input,
            output: resolved.path,
            quality: self.quality,
        };
        debug!("Compressing {} -> {}", job.input.display(), job.output.display());

        // Read before writing: the output may replace the input in place
        let original_size = FileManager::file_size(&job.input);
        match self.codec.open_and_save(&job.input, &job.output, job.quality) {
            Ok(()) => {
                let new_size = FileManager::file_size(&job.output);
                self.report.stats.add_compressed(original_size, new_size);
                self.report.outputs.push(job.output);
            }
            Err(e) => self.record_failure(job.input, Some(job.output), e.to_string()),
        }
    }

    fn record_failure(&mut self, input: PathBuf, output: Option<PathBuf>, message: String) {
        self.failure_log.record(&input, &message);
        self.report.stats.add_error();
        self.report.failures.push(CompressionFailure { input, output, message });
    }

    fn complete(&mut self) -> ProgressEvent {
        self.finished = true;
        self.report.duration = self.started.elapsed();

        let report = std::mem::take(&mut self.report);
        info!(
            "Compression {}: {}/{} files processed, {} failed ({:.2?})",
            if report.cancelled { "cancelled" } else { "complete" },
            report.processed(),
            report.total,
            report.failures.len(),
            report.duration
        );
        ProgressEvent::Done(report)
    }
}

impl Iterator for BatchRun {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<ProgressEvent> {
        if self.finished {
            return None;
        }

        let total = self.inputs.len();
        if self.next_index >= total {
            return Some(self.complete());
        }

        let end = (self.next_index + BATCH_SIZE).min(total);
        for index in self.next_index..end {
            if self.should_stop() {
                self.report.cancelled = true;
                return Some(self.complete());
            }
            self.process_item(index);
            self.next_index = index + 1;
        }

        let progress = BatchProgress::new(self.batch_index, self.next_index, total);
        self.batch_index += 1;
        debug!("Batch {} done: {}%", progress.batch_index + 1, progress.percent);

        Some(ProgressEvent::Batch(progress))
    }
}
