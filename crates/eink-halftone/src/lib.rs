//! eink-halftone: tone mapping and halftoning for e-ink displays
//!
//! This crate holds the pure, stateless pixel stages of the e-ink pipeline.
//! It does not decode or encode image files; callers hand in raw RGBA pixels
//! that already have the target dimensions and get back grayscale pixels
//! ready for packing into a PNG.
//!
//! # Quick Start
//!
//! ```
//! use eink_halftone::{halftone, HalftoneOptions};
//!
//! // 2x2 mid-gray RGBA image
//! let rgba = vec![128u8, 128, 128, 255].repeat(4);
//! let result = halftone(&rgba, 2, 2, &HalftoneOptions::new()).unwrap();
//!
//! assert_eq!(result.width(), 2);
//! assert_eq!(result.height(), 2);
//! assert!(result.is_binary());
//! ```
//!
//! # Pipeline
//!
//! ```text
//! RGBA input (already contain-fitted by the caller)
//!     |
//!     v
//! Gray           (alpha composited over white, BT.601 luma)
//!     |
//!     v
//! Contrast       (out = c*in - (128*c - 128), clamped)
//!     |
//!     v
//! Normalize      (stretch min/max to 0/255)
//!     |
//!     v
//! Floyd-Steinberg (optional, threshold cutoff, f32 work buffer)
//! ```
//!
//! The dithering pass is exact: identical input and threshold always yield
//! byte-identical output, and every unit of quantization error is either
//! pushed to an unprocessed neighbor or falls off the right/bottom edge.

mod dither;
mod error;
mod gray;
mod options;
mod output;
mod tone;

pub use dither::{floyd_steinberg, floyd_steinberg_with_stats, DiffusionStats};
pub use error::HalftoneError;
pub use gray::{luma_from_rgba, GRAY_WHITE};
pub use options::HalftoneOptions;
pub use output::{pack_bits, HalftonedImage};
pub use tone::{apply_contrast, normalize};

/// Run the full halftone pipeline on an RGBA buffer.
///
/// `rgba` must hold exactly `width * height * 4` bytes. The returned image has
/// the same dimensions; when dithering is enabled every pixel is either 0 or
/// 255.
pub fn halftone(
    rgba: &[u8],
    width: usize,
    height: usize,
    options: &HalftoneOptions,
) -> Result<HalftonedImage, HalftoneError> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(HalftoneError::EmptyImage)?;
    if width == 0 || height == 0 {
        return Err(HalftoneError::EmptyImage);
    }
    if rgba.len() != expected {
        return Err(HalftoneError::BufferSize {
            expected,
            actual: rgba.len(),
        });
    }

    let mut gray = luma_from_rgba(rgba);
    apply_contrast(&mut gray, options.contrast);
    if options.normalize {
        normalize(&mut gray);
    }

    let pixels = if options.dithering {
        floyd_steinberg(&gray, width, height, options.threshold)
    } else {
        gray
    };

    Ok(HalftonedImage::new(pixels, width, height, options.dithering))
}
