pub mod encode;
pub mod halftone;
pub mod thumbnail;

pub use encode::encode_grayscale_png;
pub use halftone::{contain_fit, process_for_eink, HalftoneProcessor};
pub use thumbnail::create_thumbnail;
