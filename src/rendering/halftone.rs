//! Decode, fit and halftone arbitrary images for e-ink panels
//!
//! The pixel stages live in `eink_halftone`; this module wraps them with
//! decoding (any format `image` understands), contain-fit resizing onto a
//! white canvas, and PNG encoding.

use crate::error::RenderError;
use crate::models::{HalftoneConfig, RenderTarget};
use crate::rendering::encode::encode_grayscale_png;
use eink_halftone::{halftone, HalftoneOptions};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::time::Instant;

/// Halftone settings bound to one configuration
#[derive(Debug, Clone, Copy)]
pub struct HalftoneProcessor {
    threshold: u8,
    contrast: f32,
}

impl HalftoneProcessor {
    pub fn new(config: &HalftoneConfig) -> Self {
        Self {
            threshold: config.threshold,
            contrast: config.contrast,
        }
    }

    /// Options for a target: only two-level panels get dithered
    pub fn options_for(&self, target: RenderTarget) -> HalftoneOptions {
        HalftoneOptions::new()
            .dithering(target.is_monochrome())
            .threshold(self.threshold)
            .contrast(self.contrast)
    }

    pub fn process(&self, input: &[u8], target: RenderTarget) -> Result<Vec<u8>, RenderError> {
        process_for_eink(input, target.width, target.height, &self.options_for(target))
    }
}

impl Default for HalftoneProcessor {
    fn default() -> Self {
        Self::new(&HalftoneConfig::default())
    }
}

/// Turn an encoded image into an e-ink ready PNG of exactly `width`×`height`.
pub fn process_for_eink(
    input: &[u8],
    width: u32,
    height: u32,
    options: &HalftoneOptions,
) -> Result<Vec<u8>, RenderError> {
    let start = Instant::now();

    let decoded = image::load_from_memory(input).map_err(|e| RenderError::Decode(e.to_string()))?;
    let source_dims = (decoded.width(), decoded.height());

    let canvas = contain_fit(&decoded, width, height);
    let halftoned = halftone(canvas.as_raw(), width as usize, height as usize, options)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    let png = encode_grayscale_png(&halftoned)?;

    tracing::debug!(
        source_width = source_dims.0,
        source_height = source_dims.1,
        width,
        height,
        dithering = options.dithering,
        bytes = png.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Halftoned image"
    );
    Ok(png)
}

/// Scale `image` to fit inside `width`×`height` and center it on white.
///
/// The aspect ratio is kept; the leftover bands are white. The returned
/// canvas always has the requested dimensions.
pub fn contain_fit(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    let (src_w, src_h) = (image.width(), image.height());
    if src_w == 0 || src_h == 0 {
        return canvas;
    }

    let scale = f64::min(
        width as f64 / src_w as f64,
        height as f64 / src_h as f64,
    );
    let fit_w = ((src_w as f64 * scale).round() as u32).clamp(1, width);
    let fit_h = ((src_h as f64 * scale).round() as u32).clamp(1, height);

    let resized = if (fit_w, fit_h) == (src_w, src_h) {
        image.to_rgba8()
    } else {
        image
            .resize_exact(fit_w, fit_h, FilterType::Lanczos3)
            .to_rgba8()
    };

    let x = (width - fit_w) / 2;
    let y = (height - fit_h) / 2;
    imageops::overlay(&mut canvas, &resized, x as i64, y as i64);
    canvas
}
