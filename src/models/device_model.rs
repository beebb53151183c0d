use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Panel geometry and color depth for a family of display terminals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceModel {
    /// Short identifier referenced by screens (e.g. "og")
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Number of displayable levels; 2 means monochrome
    pub color_depth: u32,
}

impl DeviceModel {
    /// The render target this model implies.
    pub fn target(&self) -> RenderTarget {
        RenderTarget {
            width: self.width,
            height: self.height,
            color_depth: self.color_depth,
        }
    }
}

/// Exact output geometry for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RenderTarget {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

// Upper bound keeps a single request from allocating gigabytes
const MAX_DIMENSION: u32 = 4096;

impl RenderTarget {
    pub fn new(width: u32, height: u32, color_depth: u32) -> Self {
        Self {
            width,
            height,
            color_depth,
        }
    }

    /// Monochrome targets are dithered; everything else stays grayscale.
    pub fn is_monochrome(&self) -> bool {
        self.color_depth == 2
    }

    /// Check the geometry is something the pipeline can produce.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "target dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(format!(
                "target {}x{} exceeds maximum of {MAX_DIMENSION}x{MAX_DIMENSION}",
                self.width, self.height
            ));
        }
        if self.color_depth < 2 {
            return Err(format!(
                "color depth must be at least 2, got {}",
                self.color_depth
            ));
        }
        Ok(())
    }
}
