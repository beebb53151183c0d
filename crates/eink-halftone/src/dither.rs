//! Floyd-Steinberg error diffusion to a 1-bit palette.
//!
//! Pixels are visited in row-major order, left to right and top to bottom.
//! Each pixel is quantized against a threshold and the quantization error is
//! pushed to the four not-yet-visited neighbors:
//!
//! ```text
//!        X   7
//!    3   5   1      (/16)
//! ```
//!
//! The work buffer is a flat `f32` slice indexed `y * width + x`, so the hot
//! loop never allocates and intermediate error is never rounded. Neighbors
//! outside the image are skipped; their share of the error is discarded.

/// Weights in the order right, bottom-left, bottom, bottom-right.
const FS_RIGHT: f32 = 7.0 / 16.0;
const FS_BOTTOM_LEFT: f32 = 3.0 / 16.0;
const FS_BOTTOM: f32 = 5.0 / 16.0;
const FS_BOTTOM_RIGHT: f32 = 1.0 / 16.0;

/// Bookkeeping for one diffusion pass.
///
/// `quantization_error` is the sum of `old - new` over every pixel.
/// `distributed` is the error added to in-bounds neighbors and `discarded`
/// the share that would have landed outside the image. For every input,
/// `distributed + discarded == quantization_error` up to floating-point noise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiffusionStats {
    pub quantization_error: f64,
    pub distributed: f64,
    pub discarded: f64,
}

/// Dither an 8-bit grayscale image to pure black (0) and white (255).
///
/// `gray` must hold `width * height` pixels. Pixels strictly below
/// `threshold` become black.
pub fn floyd_steinberg(gray: &[u8], width: usize, height: usize, threshold: u8) -> Vec<u8> {
    let mut work: Vec<f32> = gray.iter().map(|&v| v as f32).collect();
    diffuse(&mut work, width, height, threshold as f32, |_, _, _| {});
    finish(&work)
}

/// Like [`floyd_steinberg`], also returning error accounting for the pass.
pub fn floyd_steinberg_with_stats(
    gray: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
) -> (Vec<u8>, DiffusionStats) {
    let mut work: Vec<f32> = gray.iter().map(|&v| v as f32).collect();
    let mut stats = DiffusionStats::default();
    diffuse(
        &mut work,
        width,
        height,
        threshold as f32,
        |error, distributed, discarded| {
            stats.quantization_error += error as f64;
            stats.distributed += distributed as f64;
            stats.discarded += discarded as f64;
        },
    );
    (finish(&work), stats)
}

/// Core diffusion loop. `account` receives, per pixel, the quantization error
/// and how much of it went to in-bounds vs. out-of-bounds neighbors.
#[inline]
fn diffuse<F>(work: &mut [f32], width: usize, height: usize, threshold: f32, mut account: F)
where
    F: FnMut(f32, f32, f32),
{
    debug_assert_eq!(work.len(), width * height);

    for y in 0..height {
        let has_below = y + 1 < height;
        for x in 0..width {
            let idx = y * width + x;
            let old = work[idx];
            let new = if old < threshold { 0.0 } else { 255.0 };
            let error = old - new;
            work[idx] = new;

            let has_right = x + 1 < width;
            let has_left = x > 0;
            let mut distributed = 0.0f32;

            if has_right {
                let share = error * FS_RIGHT;
                work[idx + 1] += share;
                distributed += share;
            }
            if has_below {
                if has_left {
                    let share = error * FS_BOTTOM_LEFT;
                    work[idx + width - 1] += share;
                    distributed += share;
                }
                let share = error * FS_BOTTOM;
                work[idx + width] += share;
                distributed += share;
                if has_right {
                    let share = error * FS_BOTTOM_RIGHT;
                    work[idx + width + 1] += share;
                    distributed += share;
                }
            }

            account(error, distributed, error - distributed);
        }
    }
}

fn finish(work: &[f32]) -> Vec<u8> {
    work.iter().map(|&v| v.round().clamp(0.0, 255.0) as u8).collect()
}
