//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare gli errori possibili
//! - Fornisce messaggi di errore descrittivi per il log dei fallimenti
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori del codec immagini (formati corrotti, etc.)
//! - `UnsupportedFormat`: Estensione di output non gestita dal codec
//! - `InvalidPath`: Path di input senza nome file utilizzabile
//! - `Validation`: Errori di validazione input
//! - `NoImagesSelected` / `MissingOutputDirectory` / `AlreadyRunning`:
//!   errori lato chiamante, restituiti dalla sessione prima di avviare il batch
//! - `Worker`: Il worker in background è terminato in modo anomalo
//!
//! Gli errori per singola immagine non interrompono mai il batch: vengono
//! loggati e riportati nel `BatchReport`.
//!
//! ## Esempio:
//! ```rust,ignore
//! if session.images().is_empty() {
//!     return Err(CompressError::NoImagesSelected);
//! }
//! ```

/// Custom error types for batch compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid file name: {0}")]
    InvalidPath(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Please select images")]
    NoImagesSelected,

    #[error("Please select an output directory")]
    MissingOutputDirectory,

    #[error("A compression run is already in progress")]
    AlreadyRunning,

    #[error("Compression worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, CompressError>;
