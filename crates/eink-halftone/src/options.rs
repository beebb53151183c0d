//! Halftone pipeline options.

/// Configuration for [`halftone`](crate::halftone).
///
/// # Defaults
///
/// - Dithering: enabled
/// - Threshold: 128
/// - Contrast: 1.2
/// - Normalize: enabled
///
/// # Example
///
/// ```
/// use eink_halftone::HalftoneOptions;
///
/// let options = HalftoneOptions::new().threshold(140).contrast(1.0);
/// assert!(options.dithering);
/// assert_eq!(options.threshold, 140);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HalftoneOptions {
    /// Apply Floyd-Steinberg dithering to a 1-bit palette.
    ///
    /// When disabled the output stays continuous 8-bit grayscale.
    pub dithering: bool,

    /// Binarization cutoff: values strictly below become black.
    pub threshold: u8,

    /// Linear contrast factor applied around mid-gray.
    pub contrast: f32,

    /// Stretch the tonal range to the full 0..255 span before dithering.
    pub normalize: bool,
}

impl Default for HalftoneOptions {
    fn default() -> Self {
        Self {
            dithering: true,
            threshold: 128,
            contrast: 1.2,
            normalize: true,
        }
    }
}

impl HalftoneOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn dithering(mut self, enabled: bool) -> Self {
        self.dithering = enabled;
        self
    }

    #[inline]
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    #[inline]
    pub fn contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    #[inline]
    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }
}
