use crate::error::RenderError;
use crate::models::ThumbnailConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

/// Cover-fit `input` to the configured size and encode it as JPEG.
///
/// The image is scaled until it fills the box, then the overflow is cropped
/// evenly from both sides. No dithering is applied.
pub fn create_thumbnail(input: &[u8], config: &ThumbnailConfig) -> Result<Vec<u8>, RenderError> {
    let decoded = image::load_from_memory(input).map_err(|e| RenderError::Decode(e.to_string()))?;
    let filled = decoded.resize_to_fill(config.width, config.height, FilterType::Lanczos3);
    let rgb = filled.to_rgb8();

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, config.quality)
        .encode_image(&rgb)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}
