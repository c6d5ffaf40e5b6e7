//! Missing-channel reconstruction
//!
//! Luminance is a fixed weighted sum of the three color channels, so any one color can be
//! recovered from the other two plus luminance. Arithmetic runs in `f64` and the result
//! is truncated toward zero when stored.

use tracing::debug;

use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::matrix::{ChannelSet, Sample};

pub const RED_WEIGHT: f64 = 0.3;
pub const GREEN_WEIGHT: f64 = 0.59;
pub const BLUE_WEIGHT: f64 = 0.11;

/// The three color samples of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSamples {
    pub red: Sample,
    pub green: Sample,
    pub blue: Sample,
}

impl ColorSamples {
    pub fn is_resolved(&self) -> bool {
        self.red.is_some() && self.green.is_some() && self.blue.is_some()
    }

    fn known_count(&self) -> usize {
        [self.red, self.green, self.blue].iter().filter(|s| s.is_some()).count()
    }
}

/// Outcome of one reconstruction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructionReport {
    /// Samples computed by this pass.
    pub filled: usize,
    /// Cells that still lack at least one color afterwards.
    pub unresolved: usize,
}

/// Fills the single missing color of a cell.
///
/// Rules are tried in the order green, blue, red. A cell with two or more unknown colors,
/// or with unknown luminance, is returned unchanged.
pub fn infer_cell(samples: ColorSamples, luminance: Sample) -> ColorSamples {
    let Some(luminance) = luminance else {
        return samples;
    };
    let luminance = f64::from(luminance);
    let mut out = samples;

    if let (None, Some(red), Some(blue)) = (out.green, out.red, out.blue) {
        let green =
            (luminance - RED_WEIGHT * f64::from(red) - BLUE_WEIGHT * f64::from(blue)) / GREEN_WEIGHT;
        out.green = Some(green as i32);
    }
    if let (None, Some(red), Some(green)) = (out.blue, out.red, out.green) {
        let blue =
            (luminance - RED_WEIGHT * f64::from(red) - GREEN_WEIGHT * f64::from(green)) / BLUE_WEIGHT;
        out.blue = Some(blue as i32);
    }
    if let (None, Some(green), Some(blue)) = (out.red, out.green, out.blue) {
        let red =
            (luminance - GREEN_WEIGHT * f64::from(green) - BLUE_WEIGHT * f64::from(blue)) / RED_WEIGHT;
        out.red = Some(red as i32);
    }

    out
}

/// Runs [`infer_cell`] over every cell of `set`, in place.
///
/// A set that does not hold all four channels is left untouched: a producer role only
/// carries its own matrix, so its local pass has nothing to work with.
pub fn reconstruct(set: &mut ChannelSet) -> Result<ReconstructionReport> {
    let Some((green, blue, red, luminance)) = set.all_mut() else {
        debug!("Channel set incomplete, skipping reconstruction");
        return Ok(ReconstructionReport::default());
    };

    let dims = luminance.dims();
    for matrix in [&*green, &*blue, &*red] {
        if matrix.dims() != dims {
            return Err(ReconstructionError::InvalidDimensions(matrix.rows(), matrix.cols()));
        }
    }

    let mut report = ReconstructionReport::default();
    for offset in 0..luminance.len() {
        let before = ColorSamples {
            red: red.sample_at(offset),
            green: green.sample_at(offset),
            blue: blue.sample_at(offset),
        };
        let after = infer_cell(before, luminance.sample_at(offset));

        report.filled += after.known_count() - before.known_count();
        if !after.is_resolved() {
            report.unresolved += 1;
        }
        if after != before {
            red.set_at(offset, after.red);
            green.set_at(offset, after.green);
            blue.set_at(offset, after.blue);
        }
    }

    debug!(
        filled = report.filled,
        unresolved = report.unresolved,
        "Reconstruction pass complete"
    );
    Ok(report)
}
