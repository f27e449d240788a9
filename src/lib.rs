//! # Image Batch Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia indipendente dal front end (CLI o GUI)
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `file_manager`: Filtro immagini, normalizzazione path, discovery
//! - `image_processor`: Compressione di una singola immagine (crate `image`)
//! - `compressor`: Batch a blocchi, path di output, worker in background
//! - `session`: Stato della sessione (lista immagini, directory, progresso)
//! - `progress`: Eventi di progresso, report e statistiche
//! - `json_output`: Eventi JSON per chiamanti programmatici
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_batch_compressor::{Config, Session};
//!
//! let mut session = Session::new(Config::default());
//! session.add_images(paths);
//! session.set_output_directory(&output_dir)?;
//! let report = session.start()?.join().await?;
//! ```

pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod progress;
pub mod session;

pub use compressor::{BatchCompressor, CompressionHandle, BATCH_SIZE};
pub use config::{CollisionPolicy, Config};
pub use error::CompressError;
pub use image_processor::{ImageCodec, ImageProcessor};
pub use progress::{BatchProgress, BatchReport, ProgressEvent};
pub use session::Session;
