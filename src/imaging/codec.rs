//! Decode and delivery-encode steps of the variant pipeline.
//!
//! Every published variant goes through the same three codec steps:
//! decode the source bytes, flatten any alpha channel over white, and
//! encode to the fixed delivery format (JPEG, quality 85). Format and
//! quality are policy constants, not request parameters.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Alpha flatten | manual composite over opaque white |
//! | Encode → JPEG | `jpeg-encoder` (baseline or progressive) |

use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::io::Cursor;
use thiserror::Error;

/// Quality for all delivery encodes. Fixed policy, never per-request.
pub const DELIVERY_QUALITY: u8 = 85;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// Decode an in-memory byte stream, sniffing the format from its magic bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Produce an alpha-free raster ready for JPEG encoding.
///
/// Rasters that carry an alpha channel are composited over an opaque white
/// background; alpha is discarded, not preserved, since the delivery format
/// has no transparency. Alpha-free rasters pass through as RGB8.
pub fn flatten_alpha(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut flat = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u32;
        let bg = 255 * (255 - a);
        flat.put_pixel(
            x,
            y,
            Rgb([
                ((px[0] as u32 * a + bg) / 255) as u8,
                ((px[1] as u32 * a + bg) / 255) as u8,
                ((px[2] as u32 * a + bg) / 255) as u8,
            ]),
        );
    }
    flat
}

/// Encode a flattened raster to the delivery format.
///
/// `progressive` selects a progressive scan script; only the optimization
/// path enables it, every variant publish uses baseline.
pub fn encode_delivery(img: &RgbImage, progressive: bool) -> Result<Vec<u8>, CodecError> {
    let (w, h) = img.dimensions();
    let width = u16::try_from(w).map_err(|_| CodecError::Encode(format!("width {w} exceeds JPEG limit")))?;
    let height =
        u16::try_from(h).map_err(|_| CodecError::Encode(format!("height {h} exceeds JPEG limit")))?;

    let mut out = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut out, DELIVERY_QUALITY);
    if progressive {
        encoder.set_progressive(true);
    }
    encoder
        .encode(img.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(out)
}
