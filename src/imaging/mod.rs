//! Pixel work — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` crate (JPEG, PNG, TIFF, WebP) |
//! | **Resize** | `image::imageops` with `Lanczos3` filter |
//! | **Crop** | `DynamicImage::crop_imm`, clamped to bounds |
//! | **Encode → JPEG** | `jpeg-encoder` (quality 85, optional progressive) |
//!
//! The module is split into:
//! - **Codec**: decode, alpha flattening, delivery encoding
//! - **Transform**: dimension math plus resize-to-fit and crop

pub mod codec;
pub mod transform;

pub use codec::{CodecError, DELIVERY_QUALITY, decode, encode_delivery, flatten_alpha};
pub use transform::{CropRect, GeometryError, crop, fit_within, resize_to_fit};
