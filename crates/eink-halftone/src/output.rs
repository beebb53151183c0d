//! Halftoned output buffer and PNG row packing.

/// Result of the halftone pipeline: one gray byte per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalftonedImage {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    binary: bool,
}

impl HalftonedImage {
    /// Wrap a gray buffer. `binary` marks buffers containing only 0 and 255.
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, binary: bool) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            pixels,
            width,
            height,
            binary,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// True when every pixel is pure black or pure white.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Pack as 1-bit grayscale PNG rows (bit set = white).
    ///
    /// Only meaningful for binary images; gray values at or above 128 are
    /// treated as white.
    pub fn to_1bit_rows(&self) -> Vec<u8> {
        let bits: Vec<u8> = self.pixels.iter().map(|&v| (v >= 128) as u8).collect();
        pack_bits(&bits, self.width, 1)
    }
}

/// Pack per-pixel values into N-bit PNG row data (1, 2 or 4 bits per pixel).
///
/// Each row starts on a byte boundary, as PNG requires. Values are masked to
/// `bits` wide, most significant pixel first.
pub fn pack_bits(values: &[u8], width: usize, bits: u8) -> Vec<u8> {
    debug_assert!(matches!(bits, 1 | 2 | 4));
    if width == 0 {
        return Vec::new();
    }
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = width.div_ceil(pixels_per_byte);
    let height = values.len() / width;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in values.chunks(width) {
        let mut byte = 0u8;
        for (i, &v) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (v & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}
