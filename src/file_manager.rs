//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Filtro per estensione delle immagini selezionabili (PNG/JPEG)
//! - Normalizzazione lessicale dei path selezionati
//! - Discovery ricorsiva di immagini in directory
//! - Utilità per calcoli dimensioni e percentuali
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati selezionabili:
//! - **Immagini**: JPG, JPEG, PNG
//!
//! Il filtro vale solo al momento della selezione: in fase di compressione
//! qualunque file che il codec riesce ad aprire viene accettato.
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::collect_images(&[PathBuf::from("/photos")]);
//! for file in files {
//!     assert!(FileManager::is_supported_image(&file));
//! }
//! ```

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Check if a file has one of the selectable image extensions
    pub fn is_supported_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "jpg" | "jpeg" | "png")
        } else {
            false
        }
    }

    /// Lexically normalize a path: drops `.` segments and folds `..` into
    /// the preceding component. The filesystem is not touched.
    pub fn normalize_path(path: &Path) -> PathBuf {
        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    let ends_with_normal = matches!(
                        normalized.components().next_back(),
                        Some(Component::Normal(_))
                    );
                    if ends_with_normal {
                        normalized.pop();
                    } else if !normalized.has_root() {
                        normalized.push("..");
                    }
                }
                other => normalized.push(other.as_os_str()),
            }
        }

        if normalized.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            normalized
        }
    }

    /// Find all selectable images in a directory, sorted for a stable order
    pub fn find_images(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::is_supported_image(path))
            .collect();

        files.sort();
        files
    }

    /// Expand a mix of files and directories into a list of image files.
    /// Plain files are kept as given (filtering happens on selection).
    pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_dir() {
                files.extend(Self::find_images(path));
            } else {
                files.push(path.clone());
            }
        }

        files
    }

    /// File size in bytes, 0 if the file can't be read
    pub fn file_size(path: &Path) -> u64 {
        std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
