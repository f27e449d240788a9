//! # Image Processing Module
//!
//! Questo modulo implementa il passo di compressione di una singola immagine.
//! Nessun algoritmo di compressione è implementato qui: decodifica e
//! ri-codifica sono delegate interamente alla crate `image`.
//!
//! ## Responsabilità:
//! - Definisce il trait `ImageCodec`, il collaboratore esterno usato dal batch
//! - Implementa `ImageProcessor`, il codec reale basato su `image`
//!
//! ## Formati di output
//!
//! | Formato | Encoder | Qualità |
//! |---------|---------|---------|
//! | JPEG    | `JpegEncoder` (RGB8) | passata invariata |
//! | PNG     | `PngEncoder`, compressione Best + filtro Adaptive | ignorata |
//! | Altri   | encoder di default della crate `image` | ignorata |
//!
//! Il formato di output è dedotto dall'estensione del path di output.
//!
//! ## Error handling
//! - Il sorgente viene decodificato completamente prima di creare il file di
//!   destinazione: un input corrotto non lascia file vuoti in output
//! - Se la codifica fallisce a metà, il file parziale viene rimosso
//! - Nessun retry: l'errore risale al batch che lo logga e prosegue
//!
//! ## Esempio:
//! ```rust,ignore
//! let codec = ImageProcessor::new();
//! codec.open_and_save(Path::new("in/photo.jpg"), Path::new("out/photo_compressed.jpg"), 85)?;
//! ```

use crate::error::{CompressError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Single-image compression step.
///
/// Implementations must be usable from the background worker thread.
pub trait ImageCodec: Send + Sync {
    /// Open `input`, save it to `output` with optimization enabled and the given quality
    fn open_and_save(&self, input: &Path, output: &Path, quality: u8) -> Result<()>;
}

/// Codec backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Decode the source image, guessing the format from its content
    fn open(input: &Path) -> Result<DynamicImage> {
        let image = image::io::Reader::open(input)?
            .with_guessed_format()?
            .decode()?;
        Ok(image)
    }

    /// Encode `image` into `writer` in the given format
    fn encode<W: Write>(
        image: &DynamicImage,
        format: ImageFormat,
        quality: u8,
        writer: &mut W,
    ) -> Result<()> {
        match format {
            ImageFormat::Jpeg => {
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut *writer, quality).write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ColorType::Rgb8,
                )?;
            }
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut *writer,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                match image.color() {
                    ColorType::Rgb32F | ColorType::Rgba32F => {
                        let rgba = image.to_rgba8();
                        encoder.write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)?;
                    }
                    color => {
                        encoder.write_image(image.as_bytes(), image.width(), image.height(), color)?;
                    }
                }
            }
            other => {
                // Needs Seek, so go through an in-memory buffer
                let mut buffer = std::io::Cursor::new(Vec::new());
                image.write_to(&mut buffer, other)?;
                writer.write_all(buffer.get_ref())?;
            }
        }
        Ok(())
    }
}

impl ImageCodec for ImageProcessor {
    fn open_and_save(&self, input: &Path, output: &Path, quality: u8) -> Result<()> {
        let format = ImageFormat::from_path(output).map_err(|_| {
            CompressError::UnsupportedFormat(format!("Cannot write {}", output.display()))
        })?;

        let image = Self::open(input)?;
        debug!(
            "Decoded {} ({}x{}, {:?})",
            input.display(),
            image.width(),
            image.height(),
            image.color()
        );

        let mut writer = BufWriter::new(File::create(output)?);
        let written = Self::encode(&image, format, quality, &mut writer)
            .and_then(|_| writer.flush().map_err(CompressError::from));

        if let Err(e) = written {
            drop(writer);
            let _ = std::fs::remove_file(output);
            return Err(e);
        }

        debug!("Saved {} as {:?} (quality {})", output.display(), format, quality);
        Ok(())
    }
}
