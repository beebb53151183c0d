use crate::error::RenderError;
use eink_halftone::HalftonedImage;
use std::io::Cursor;

/// Encode a halftoned image as a lossless grayscale PNG.
///
/// Binary images are written 1 bit per pixel, anything else as 8-bit gray.
/// The result is re-compressed with oxipng; if that fails the plain encoding
/// is returned unchanged.
pub fn encode_grayscale_png(image: &HalftonedImage) -> Result<Vec<u8>, RenderError> {
    let (bit_depth, data) = if image.is_binary() {
        (png::BitDepth::One, image.to_1bit_rows())
    } else {
        (png::BitDepth::Eight, image.pixels().to_vec())
    };

    let png_bytes = write_png(image.width() as u32, image.height() as u32, bit_depth, &data)?;

    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    Ok(optimized)
}

fn write_png(
    width: u32,
    height: u32,
    bit_depth: png::BitDepth,
    data: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Best);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
