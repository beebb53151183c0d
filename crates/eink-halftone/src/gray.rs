//! RGBA to single-channel grayscale conversion.

/// Gray value used for letterbox padding and transparent pixels.
pub const GRAY_WHITE: u8 = 255;

/// Convert RGBA pixel data to 8-bit luma, alpha-compositing against white.
///
/// Uses BT.601 weights (0.299, 0.587, 0.114) with integer rounding so the
/// result is identical on every platform.
pub fn luma_from_rgba(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .map(|pixel| {
            let (r, g, b, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
            let (r, g, b) = match a {
                255 => (r, g, b),
                0 => (GRAY_WHITE, GRAY_WHITE, GRAY_WHITE),
                _ => (over_white(r, a), over_white(g, a), over_white(b, a)),
            };
            luma(r, g, b)
        })
        .collect()
}

#[inline]
fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    ((channel as u16 * a + 255 * (255 - a) + 127) / 255) as u8
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    // Weights scaled by 1000, +500 for round-half-up
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}
