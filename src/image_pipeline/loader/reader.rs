use std::path::Path;

use crate::image_pipeline::common::{Cancellation, Result};
use crate::image_pipeline::matrix::ChannelMatrix;

pub trait ChannelReader {
    /// Reads a `rows` x `cols` channel, giving up with `Cancelled` once `cancel` is raised.
    fn read_channel(&self, path: &Path, rows: usize, cols: usize, cancel: &Cancellation) -> Result<ChannelMatrix>;
}
