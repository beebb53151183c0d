//! Tone adjustments applied before dithering.

/// Linear contrast around mid-gray: `out = c * in - (128 * c - 128)`.
///
/// Results are rounded and clamped to `[0, 255]`. A contrast of `1.0` is the
/// identity.
pub fn apply_contrast(gray: &mut [u8], contrast: f32) {
    let offset = 128.0 * contrast - 128.0;
    for v in gray.iter_mut() {
        let adjusted = contrast * *v as f32 - offset;
        *v = adjusted.round().clamp(0.0, 255.0) as u8;
    }
}

/// Stretch the tonal range so the darkest pixel becomes 0 and the lightest 255.
///
/// Flat images (min == max) are left unchanged.
pub fn normalize(gray: &mut [u8]) {
    let Some(&min) = gray.iter().min() else {
        return;
    };
    let max = gray.iter().copied().max().unwrap_or(min);
    if min == max || (min == 0 && max == 255) {
        return;
    }

    let range = (max - min) as f32;
    for v in gray.iter_mut() {
        let stretched = (*v - min) as f32 * 255.0 / range;
        *v = stretched.round() as u8;
    }
}
