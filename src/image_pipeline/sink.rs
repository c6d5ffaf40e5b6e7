//! Image sink module
//!
//! The compositor hands its raster to an [`ImageSink`]; the default sink encodes TIFF.

mod tiff_sink;
pub mod types;
mod writer;

pub use tiff_sink::TiffImageSink;
pub use types::TiffCompression;
pub use writer::{ImageOutput, ImageSink};
