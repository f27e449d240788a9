//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output:
//! `{directory}/{nome-senza-estensione}{suffisso}{estensione-originale}`.
//!
//! `OutputPlanner` tiene traccia dei nomi già assegnati in un run per
//! rilevare due input con lo stesso basename (da cartelle diverse).

use crate::config::CollisionPolicy;
use crate::error::{CompressError, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output per un file dato
    pub fn get_output_path(input_path: &Path, output_dir: &Path, suffix: &str) -> Result<PathBuf> {
        Self::build(input_path, output_dir, suffix, None)
    }

    /// Come `get_output_path`, con un contatore `_n` dopo il suffisso
    pub fn get_numbered_output_path(
        input_path: &Path,
        output_dir: &Path,
        suffix: &str,
        n: usize,
    ) -> Result<PathBuf> {
        Self::build(input_path, output_dir, suffix, Some(n))
    }

    fn build(input_path: &Path, output_dir: &Path, suffix: &str, n: Option<usize>) -> Result<PathBuf> {
        let file_stem = input_path
            .file_stem()
            .ok_or_else(|| CompressError::InvalidPath(input_path.display().to_string()))?;

        let mut filename = OsString::from(file_stem);
        filename.push(suffix);
        if let Some(n) = n {
            filename.push(format!("_{}", n));
        }
        if let Some(ext) = input_path.extension() {
            filename.push(".");
            filename.push(ext);
        }

        Ok(output_dir.join(filename))
    }
}

/// Output path assegnato a un input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub path: PathBuf,
    /// Un input precedente dello stesso run puntava allo stesso nome
    pub collided: bool,
}

/// Assegna i path di output di un run, applicando la `CollisionPolicy`
pub struct OutputPlanner {
    output_dir: PathBuf,
    suffix: String,
    policy: CollisionPolicy,
    used: HashSet<PathBuf>,
}

impl OutputPlanner {
    pub fn new(output_dir: PathBuf, suffix: String, policy: CollisionPolicy) -> Self {
        Self {
            output_dir,
            suffix,
            policy,
            used: HashSet::new(),
        }
    }

    /// Risolve il path di output per il prossimo input, in ordine
    pub fn resolve(&mut self, input_path: &Path) -> Result<ResolvedOutput> {
        let path = PathResolver::get_output_path(input_path, &self.output_dir, &self.suffix)?;

        if self.used.insert(path.clone()) {
            return Ok(ResolvedOutput { path, collided: false });
        }

        match self.policy {
            CollisionPolicy::Overwrite => {
                warn!(
                    "Output name collision, {} will overwrite {}",
                    input_path.display(),
                    path.display()
                );
                Ok(ResolvedOutput { path, collided: true })
            }
            CollisionPolicy::Rename => {
                let mut n = 2;
                loop {
                    let candidate = PathResolver::get_numbered_output_path(
                        input_path,
                        &self.output_dir,
                        &self.suffix,
                        n,
                    )?;
                    if self.used.insert(candidate.clone()) {
                        debug!("Output name collision, renamed: {} -> {}", path.display(), candidate.display());
                        return Ok(ResolvedOutput { path: candidate, collided: true });
                    }
                    n += 1;
                }
            }
        }
    }
}
