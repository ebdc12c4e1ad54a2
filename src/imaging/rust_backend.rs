//! Pure Rust image processing backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Decode (AVIF) | `avif-parse` + `rav1d`, see [`avif`](super::avif) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` (lossless, quality ignored) |
//! | Encode → WebP | `WebPEncoder::new_lossless` (the pure Rust encoder has no lossy mode) |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |

use super::avif;
use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, RenderParams};
use crate::config::Format;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// Load and decode an image from disk.
///
/// The format is sniffed from the content so a mislabelled extension still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    if is_avif(path) {
        return avif::decode(path);
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Drop to 8 bits per channel, keeping alpha only when present.
fn to_8bit(img: DynamicImage, keep_alpha: bool) -> DynamicImage {
    if keep_alpha && img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.into_rgb8())
    }
}

fn encode_failed(format: Format, e: image::ImageError) -> BackendError {
    BackendError::ProcessingFailed(format!("{format} encode failed: {e}"))
}

/// Encode `img` as `format` into `path` (atomically).
fn save_image(
    img: DynamicImage,
    path: &Path,
    format: Format,
    quality: Quality,
) -> Result<(), BackendError> {
    let q = quality.value() as u8;
    crate::fs_ops::write_atomic(path, |writer| match format {
        Format::Jpg | Format::Jpeg => to_8bit(img, false)
            .write_with_encoder(JpegEncoder::new_with_quality(writer, q))
            .map_err(|e| encode_failed(format, e)),
        Format::Png => img
            .write_with_encoder(PngEncoder::new(writer))
            .map_err(|e| encode_failed(format, e)),
        Format::Webp => to_8bit(img, true)
            .write_with_encoder(WebPEncoder::new_lossless(writer))
            .map_err(|e| encode_failed(format, e)),
        Format::Avif => to_8bit(img, true)
            .write_with_encoder(AvifEncoder::new_with_speed_quality(writer, 6, q))
            .map_err(|e| encode_failed(format, e)),
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if is_avif(path) {
            return avif::identify(path);
        }
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to read dimensions of {}: {}",
                    path.display(),
                    e
                ))
            })?;
        Ok(Dimensions { width, height })
    }

    fn render(&self, params: &RenderParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(resized, &params.output, params.format, params.quality)
    }
}
