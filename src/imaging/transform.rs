//! Geometric operations: aspect-preserving downscale and rectangular crop.
//!
//! Dimension math lives in pure functions (unit testable without touching
//! pixels); the raster work uses the `image` crate with Lanczos3 resampling.

use image::DynamicImage;
use image::imageops::FilterType;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("crop rectangle {rect:?} lies outside the {width}x{height} source")]
    OutOfBounds {
        rect: CropRect,
        width: u32,
        height: u32,
    },
}

/// Axis-aligned crop rectangle `[x, x+width) × [y, y+height)`.
///
/// Deserialized from job payloads; omitted fields take the avatar-crop
/// defaults (origin 0,0 and a 500×500 window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CropRect {
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "default_crop_edge")]
    pub width: u32,
    #[serde(default = "default_crop_edge")]
    pub height: u32,
}

fn default_crop_edge() -> u32 {
    500
}

impl Default for CropRect {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: default_crop_edge(),
            height: default_crop_edge(),
        }
    }
}

/// Compute the dimensions `source` takes when scaled to fit within `max`.
///
/// Aspect-preserving; never upscales. Returns `source` unchanged when it
/// already fits.
pub fn fit_within(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = max;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let ratio = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * ratio).round() as u32).max(1);
    let h = ((src_h as f64 * ratio).round() as u32).max(1);
    (w.min(max_w), h.min(max_h))
}

/// Downscale so the image fits within `max_w × max_h`, preserving aspect.
///
/// A no-op when the image already fits — variants bounded larger than the
/// source are published at source dimensions, never upscaled.
pub fn resize_to_fit(img: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let dims = (img.width(), img.height());
    if fit_within(dims, (max_w, max_h)) == dims {
        return img;
    }
    img.resize(max_w, max_h, FilterType::Lanczos3)
}

/// Extract `rect` from the image, clamping the rectangle to source bounds.
///
/// Clamping (rather than rejecting) matches the behavior avatar cropping
/// relies on: the default 500×500 window must work against sources smaller
/// than 500px. A rectangle that does not intersect the image at all — origin
/// at or beyond an edge, or zero-sized — fails with
/// [`GeometryError::OutOfBounds`].
pub fn crop(img: &DynamicImage, rect: CropRect) -> Result<DynamicImage, GeometryError> {
    let (w, h) = (img.width(), img.height());
    if rect.width == 0 || rect.height == 0 || rect.x >= w || rect.y >= h {
        return Err(GeometryError::OutOfBounds {
            rect,
            width: w,
            height: h,
        });
    }

    let crop_w = rect.width.min(w - rect.x);
    let crop_h = rect.height.min(h - rect.y);
    Ok(img.crop_imm(rect.x, rect.y, crop_w, crop_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::decode;
    use crate::test_helpers::jpeg_bytes;

    // =========================================================================
    // fit_within (pure math)
    // =========================================================================

    #[test]
    fn fit_no_op_when_already_fits() {
        assert_eq!(fit_within((400, 300), (600, 600)), (400, 300));
        assert_eq!(fit_within((600, 600), (600, 600)), (600, 600));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within((100, 80), (1200, 1200)), (100, 80));
    }

    #[test]
    fn fit_landscape_bounded_by_width() {
        assert_eq!(fit_within((2000, 1000), (600, 600)), (600, 300));
    }

    #[test]
    fn fit_portrait_bounded_by_height() {
        assert_eq!(fit_within((1000, 2000), (600, 600)), (300, 600));
    }

    #[test]
    fn fit_preserves_aspect_within_one_pixel() {
        let (w, h) = fit_within((1999, 1333), (600, 600));
        assert!(w <= 600 && h <= 600);
        // the shorter edge agrees with the source aspect up to rounding
        let src_aspect = 1999.0 / 1333.0;
        assert_eq!((h as f64 * src_aspect).round() as u32, w);
    }

    #[test]
    fn fit_extreme_aspect_keeps_at_least_one_pixel() {
        assert_eq!(fit_within((10000, 10), (100, 100)), (100, 1));
    }

    // =========================================================================
    // resize_to_fit
    // =========================================================================

    #[test]
    fn resize_within_bounds() {
        let img = decode(&jpeg_bytes(2000, 1500)).unwrap();
        let resized = resize_to_fit(img, 600, 600);
        assert!(resized.width() <= 600);
        assert!(resized.height() <= 600);
        assert_eq!(resized.width(), 600);
        assert_eq!(resized.height(), 450);
    }

    #[test]
    fn resize_is_no_op_when_source_fits() {
        let img = decode(&jpeg_bytes(120, 90)).unwrap();
        let resized = resize_to_fit(img, 600, 600);
        assert_eq!((resized.width(), resized.height()), (120, 90));
    }

    // =========================================================================
    // crop
    // =========================================================================

    #[test]
    fn crop_contained_rect() {
        let img = decode(&jpeg_bytes(200, 200)).unwrap();
        let out = crop(
            &img,
            CropRect {
                x: 10,
                y: 20,
                width: 50,
                height: 60,
            },
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (50, 60));
    }

    #[test]
    fn crop_clamps_overhanging_rect() {
        let img = decode(&jpeg_bytes(300, 300)).unwrap();
        // Default avatar window exceeds a 300px source on both axes
        let out = crop(&img, CropRect::default()).unwrap();
        assert_eq!((out.width(), out.height()), (300, 300));
    }

    #[test]
    fn crop_clamps_partial_overhang() {
        let img = decode(&jpeg_bytes(100, 100)).unwrap();
        let out = crop(
            &img,
            CropRect {
                x: 80,
                y: 0,
                width: 50,
                height: 50,
            },
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (20, 50));
    }

    #[test]
    fn crop_origin_outside_errors() {
        let img = decode(&jpeg_bytes(100, 100)).unwrap();
        let rect = CropRect {
            x: 100,
            y: 0,
            width: 10,
            height: 10,
        };
        assert!(matches!(
            crop(&img, rect),
            Err(GeometryError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn crop_zero_sized_errors() {
        let img = decode(&jpeg_bytes(100, 100)).unwrap();
        let rect = CropRect {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        assert!(matches!(
            crop(&img, rect),
            Err(GeometryError::OutOfBounds { .. })
        ));
    }

    // =========================================================================
    // CropRect deserialization (job payload defaults)
    // =========================================================================

    #[test]
    fn crop_rect_defaults_from_empty_payload() {
        let rect: CropRect = serde_json::from_str("{}").unwrap();
        assert_eq!(
            rect,
            CropRect {
                x: 0,
                y: 0,
                width: 500,
                height: 500
            }
        );
    }

    #[test]
    fn crop_rect_partial_payload() {
        let rect: CropRect = serde_json::from_str(r#"{"x": 10, "width": 40}"#).unwrap();
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 500);
    }
}
