//! Error type for the halftone pipeline.

use std::fmt;

/// Errors returned by [`halftone`](crate::halftone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalftoneError {
    /// Width or height is zero (or the pixel count overflows).
    EmptyImage,
    /// The RGBA buffer length does not match `width * height * 4`.
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for HalftoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalftoneError::EmptyImage => write!(f, "image has no pixels"),
            HalftoneError::BufferSize { expected, actual } => write!(
                f,
                "pixel buffer has {} bytes, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for HalftoneError {}
