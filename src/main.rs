//! # Image Batch Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso dell'applicazione a riga di comando.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Inizializzazione del sistema di logging con `tracing`
//! - Avvio della sessione e visualizzazione del progresso
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (immagini, directory output, quality, suffix, etc.)
//! 2. Carica la configurazione e applica gli override
//! 3. Configura il logging (INFO o DEBUG, più file di soli errori opzionale)
//! 4. Espande le directory in input e popola la sessione
//! 5. Avvia il worker e mostra progress bar o eventi JSON
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-compressor ~/Pictures/trip -o ~/Pictures/trip-small --quality 70
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use image_batch_compressor::file_manager::FileManager;
use image_batch_compressor::json_output::{JsonConfig, JsonMessage};
use image_batch_compressor::progress::{BatchReport, ProgressManager};
use image_batch_compressor::{CollisionPolicy, Config, ProgressEvent, Session};

#[derive(Parser)]
#[command(name = "image-compressor")]
#[command(about = "Compress a batch of PNG/JPEG images into an output directory")]
struct Args {
    /// Images to compress, or directories to search for images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for compressed copies
    #[arg(short, long)]
    output: PathBuf,

    /// JPEG quality (1-100) [default: 85]
    #[arg(short, long)]
    quality: Option<u8>,

    /// Suffix added before the file extension [default: _compressed]
    #[arg(short, long)]
    suffix: Option<String>,

    /// Give numbered names to outputs that would overwrite each other
    #[arg(long)]
    rename_collisions: bool,

    /// Configuration file [default: ~/.image-compressor/config.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the effective configuration to the configuration file
    #[arg(long)]
    save_config: bool,

    /// Output progress and status as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Append compression errors to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The config file may turn JSON mode on once it has loaded
    let mut json_output = args.json;
    if let Err(e) = execute(&args, &mut json_output).await {
        if json_output {
            JsonMessage::error(e.to_string(), e.chain().nth(1).map(|cause| cause.to_string())).emit();
        }
        return Err(e);
    }

    Ok(())
}

async fn execute(args: &Args, json_output: &mut bool) -> Result<()> {
    let config = load_config(args).await?;
    *json_output = config.json_output;

    init_logging(args.verbose, config.log_file.as_deref())?;
    run(args, config).await
}

/// Configuration file values overridden by command line flags
async fn load_config(args: &Args) -> Result<Config> {
    let config_path = match args.config {
        Some(ref path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            Some(path.clone())
        }
        None => Config::default_path(),
    };

    let mut config = match config_path {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };

    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if let Some(ref suffix) = args.suffix {
        config.suffix = suffix.clone();
    }
    if args.rename_collisions {
        config.collision_policy = CollisionPolicy::Rename;
    }
    if args.json {
        config.json_output = true;
    }
    if let Some(ref log_file) = args.log_file {
        config.log_file = Some(log_file.clone());
    }

    config.validate()?;

    if args.save_config {
        let path = config_path
            .ok_or_else(|| anyhow::anyhow!("No configuration file location available"))?;
        config.save_to_file(&path).await?;
    }

    Ok(config)
}

/// Stderr logging at INFO (DEBUG with `--verbose`, or `RUST_LOG`), plus an
/// optional error-only log file
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(LevelFilter::ERROR),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry().with(stderr_layer).with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

async fn run(args: &Args, config: Config) -> Result<()> {
    // Validate and create output directory
    if !args.output.exists() {
        std::fs::create_dir_all(&args.output)?;
        info!("Created output directory: {}", args.output.display());
    }
    if !args.output.is_dir() {
        return Err(anyhow::anyhow!("Output path is not a directory: {}", args.output.display()));
    }

    let json_output = config.json_output;
    let mut session = Session::new(config);

    let candidates = FileManager::collect_images(&args.inputs);
    let added = session.add_images(&candidates);
    if added < candidates.len() {
        warn!("Skipped {} paths (not PNG/JPEG or listed twice)", candidates.len() - added);
    }
    session.set_output_directory(&args.output)?;

    let mut handle = session.start()?;

    let stop_sender = handle.stop_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current image");
            let _ = stop_sender.send(());
        }
    });

    let progress = if json_output {
        JsonMessage::start(
            args.output.clone(),
            handle.total(),
            JsonConfig::from(session.config()),
        )
        .emit();
        None
    } else {
        Some(ProgressManager::new(handle.total() as u64))
    };

    while let Some(event) = handle.next_event().await {
        session.apply(&event);
        if let ProgressEvent::Batch(ref batch) = event {
            match progress {
                Some(ref bar) => bar.update(batch),
                None => JsonMessage::progress(batch).emit(),
            }
        }
    }

    let report = handle.join().await?;

    match progress {
        Some(bar) => {
            if report.cancelled {
                bar.abandon("Cancelled");
            } else {
                bar.finish(&report.stats.format_summary());
            }
            print_final_stats(&report);
        }
        None => {
            for failure in &report.failures {
                JsonMessage::file_failed(failure).emit();
            }
            JsonMessage::complete(&report).emit();
        }
    }

    Ok(())
}

/// Stampa statistiche finali
fn print_final_stats(report: &BatchReport) {
    if report.cancelled {
        info!("=== Compression Cancelled ===");
    } else {
        info!("=== Compression Complete ===");
    }
    info!("Files processed: {}/{}", report.processed(), report.total);
    info!("Files compressed: {}", report.stats.files_compressed);
    info!("Errors: {}", report.stats.errors);
    info!("Bytes saved: {}", FileManager::format_size(report.stats.bytes_saved()));
    info!("Average reduction: {:.2}%", report.stats.overall_reduction_percent());
    info!("Duration: {:.2?}", report.duration);

    for failure in &report.failures {
        warn!("Not compressed: {} ({})", failure.input.display(), failure.message);
    }
    for collision in &report.collisions {
        warn!("Written more than once: {}", collision.display());
    }
}
