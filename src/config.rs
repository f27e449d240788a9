//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri di compressione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità JPEG (1-100, default: 85)
//! - `suffix`: Suffisso inserito prima dell'estensione (default: "_compressed")
//! - `collision_policy`: Cosa fare se due input producono lo stesso output
//!   (default: `Overwrite`, l'ultimo file vince)
//! - `json_output`: Emette eventi JSON su stdout invece della progress bar
//! - `log_file`: File su cui scrivere solo gli errori (default: nessuno)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che suffix non contenga separatori di path
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 40,
//!     suffix: "_small".to_string(),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default JPEG quality, same value the compressed copies always used
pub const DEFAULT_QUALITY: u8 = 85;

/// Default suffix for compressed copies
pub const DEFAULT_SUFFIX: &str = "_compressed";

/// How to handle two inputs that map to the same output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Last write wins; collisions are logged and reported
    #[default]
    Overwrite,
    /// Later inputs get a numbered name (`photo_compressed_2.jpg`)
    Rename,
}

/// Configuration for batch compression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Suffix inserted between file stem and extension
    pub suffix: String,
    /// Output name collision handling
    pub collision_policy: CollisionPolicy,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Error-only log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            suffix: DEFAULT_SUFFIX.to_string(),
            collision_policy: CollisionPolicy::default(),
            json_output: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.suffix.contains('/') || self.suffix.contains('\\') {
            return Err(anyhow::anyhow!("Suffix must not contain path separators: {}", self.suffix));
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".image-compressor").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
