use std::io::{Seek, Write};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::compositor::Raster;
use crate::image_pipeline::config::ReconstructionConfig;

/// Destination of an encoded image. Container formats patch offsets after the pixel data,
/// so the output has to be seekable.
pub trait ImageOutput: Write + Seek {}

impl<T: Write + Seek + ?Sized> ImageOutput for T {}

pub trait ImageSink {
    fn write_image(&self, raster: &Raster, output: &mut dyn ImageOutput, config: &ReconstructionConfig) -> Result<()>;
}
