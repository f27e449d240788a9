//! # Session State Module
//!
//! Questo modulo sostituisce lo stato globale del front end (lista immagini,
//! directory di output, barra di progresso) con una struct esplicita.
//!
//! ## Responsabilità:
//! - Mantiene la lista delle immagini in attesa e la directory di output
//! - Valida le precondizioni prima di avviare un run (lista non vuota,
//!   directory selezionata, nessun run già in corso)
//! - Avvia il worker in background su uno snapshot dello stato
//! - Tiene il valore di progresso da mostrare, azzerato a fine run
//!
//! Qualunque front end (CLI, GUI) è un adattatore sottile sopra `Session`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut session = Session::new(Config::default());
//! session.add_images(["/photos/a.jpg", "/photos/b.png"]);
//! session.set_output_directory("/tmp/out")?;
//!
//! let mut handle = session.start()?;
//! while let Some(event) = handle.next_event().await {
//!     session.apply(&event);
//! }
//! ```

use crate::compressor::{BatchCompressor, CompressionHandle, CompressionWorker};
use crate::config::Config;
use crate::error::{CompressError, Result};
use crate::file_manager::FileManager;
use crate::progress::ProgressEvent;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State of one interactive compression session
pub struct Session {
    images: Vec<PathBuf>,
    output_directory: Option<PathBuf>,
    config: Config,
    compressor: BatchCompressor,
    progress: u8,
    running: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_compressor(config, BatchCompressor::new())
    }

    pub fn with_compressor(config: Config, compressor: BatchCompressor) -> Self {
        Self {
            images: Vec::new(),
            output_directory: None,
            config,
            compressor,
            progress: 0,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pending images, in selection order
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Progress to display, 0 when idle
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Add PNG/JPEG files to the pending list. Other extensions and paths
    /// already pending are skipped. Returns how many were added.
    pub fn add_images<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let before = self.images.len();

        for path in paths {
            let path = path.as_ref();
            if !FileManager::is_supported_image(path) {
                debug!("Skipping non-image selection: {}", path.display());
                continue;
            }
            let normalized = FileManager::normalize_path(path);
            if self.images.contains(&normalized) {
                debug!("Skipping duplicate selection: {}", normalized.display());
                continue;
            }
            self.images.push(normalized);
        }

        self.images.len() - before
    }

    /// Remove the images at the given list positions. Out-of-range indices
    /// are ignored. Returns how many were removed.
    pub fn remove_images(&mut self, indices: &[usize]) -> usize {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();

        let mut removed = 0;
        // Highest first so earlier positions stay valid
        for index in indices.into_iter().rev() {
            if index < self.images.len() {
                self.images.remove(index);
                removed += 1;
            }
        }
        removed
    }

    /// Select the output directory; it must already exist
    pub fn set_output_directory(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(CompressError::Validation(format!(
                "Output path is not a directory: {}",
                dir.display()
            )));
        }
        info!("Output directory: {}", dir.display());
        self.output_directory = Some(dir);
        Ok(())
    }

    /// Snapshot the pending list and start compressing it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<CompressionHandle> {
        if self.images.is_empty() {
            warn!("Missing selection: no images to compress");
            return Err(CompressError::NoImagesSelected);
        }

        let output_dir = match self.output_directory {
            Some(ref dir) => dir.clone(),
            None => {
                warn!("Missing output directory");
                return Err(CompressError::MissingOutputDirectory);
            }
        };
        if !output_dir.is_dir() {
            return Err(CompressError::Validation(format!(
                "Output directory no longer exists: {}",
                output_dir.display()
            )));
        }

        self.config
            .validate()
            .map_err(|e| CompressError::Validation(e.to_string()))?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CompressError::AlreadyRunning);
        }

        info!(
            "Starting compression of {} images into {} (quality {})",
            self.images.len(),
            output_dir.display(),
            self.config.quality
        );

        self.progress = 0;
        let run = self.compressor.compress(self.images.clone(), &output_dir, &self.config);
        Ok(CompressionWorker::spawn_tracked(run, Arc::clone(&self.running)))
    }

    /// Update the displayed progress from a worker event
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Batch(progress) => {
                self.progress = self.progress.max(progress.percent);
            }
            ProgressEvent::Done(_) => {
                self.progress = 0;
            }
        }
    }
}
