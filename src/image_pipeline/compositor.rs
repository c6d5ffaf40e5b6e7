//! Image compositing
//!
//! Turns the three reconstructed color channels into a BGRA raster. Samples are saturated
//! into the displayable range; a sample that is still unknown renders as 0 and is
//! counted so the caller can decide what to do about it.

use tracing::debug;

use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::matrix::{ChannelMatrix, Sample};

pub const BYTES_PER_PIXEL: usize = 4;
pub const OPAQUE: u8 = u8::MAX;

/// Interleaved 8-bit BGRA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    /// `[B, G, R, A, B, G, R, A, ...]`
    pub data: Vec<u8>,
}

impl Raster {
    /// Returns the `[B, G, R, A]` bytes at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) outside raster");
        let offset = (y * self.width + x) * BYTES_PER_PIXEL;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ]
    }
}

/// Raster plus the number of color samples that were rendered without a value.
#[derive(Debug, Clone)]
pub struct Composite {
    pub raster: Raster,
    pub unresolved: usize,
}

/// Saturates a sample into `[0, 255]`. Unknown samples become 0.
pub fn clamp_sample(sample: Sample) -> u8 {
    sample.map_or(0, |value| value.clamp(0, i32::from(u8::MAX)) as u8)
}

pub fn composite(green: &ChannelMatrix, blue: &ChannelMatrix, red: &ChannelMatrix) -> Result<Composite> {
    let (rows, cols) = green.dims();
    for matrix in [blue, red] {
        if matrix.dims() != (rows, cols) {
            return Err(ReconstructionError::InvalidDimensions(matrix.rows(), matrix.cols()));
        }
    }

    debug!("Compositing {}x{} raster", cols, rows);

    let mut data = Vec::with_capacity(rows * cols * BYTES_PER_PIXEL);
    let mut unresolved = 0;

    let cells = green.samples().zip(blue.samples()).zip(red.samples());
    for ((g, b), r) in cells {
        unresolved += [g, b, r].iter().filter(|s| s.is_none()).count();
        data.extend_from_slice(&[clamp_sample(b), clamp_sample(g), clamp_sample(r), OPAQUE]);
    }

    Ok(Composite {
        raster: Raster {
            width: cols,
            height: rows,
            data,
        },
        unresolved,
    })
}
