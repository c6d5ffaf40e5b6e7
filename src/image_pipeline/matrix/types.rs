//! Sample grid types

use crate::image_pipeline::common::error::{ReconstructionError, Result};

/// One cell of a channel. `None` marks a sample that is not known yet.
pub type Sample = Option<i32>;

/// Row-major grid of samples with fixed dimensions.
///
/// Values and presence live in parallel buffers (4 + 1 bytes per cell), so a reference
/// size channel costs about as much as a plain `i32` grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMatrix {
    rows: usize,
    cols: usize,
    values: Vec<i32>,
    known: Vec<bool>,
}

impl ChannelMatrix {
    /// Allocates a grid where every cell is unknown.
    pub fn unknown(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0; rows * cols],
            known: vec![false; rows * cols],
        }
    }

    /// Allocates a grid where every cell holds `value`.
    pub fn filled(rows: usize, cols: usize, value: i32) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
            known: vec![true; rows * cols],
        }
    }

    /// Builds a grid from a row-major list of samples.
    pub fn from_samples(rows: usize, cols: usize, cells: Vec<Sample>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(ReconstructionError::InvalidDimensions(rows, cols));
        }
        let mut matrix = Self::unknown(rows, cols);
        for (offset, sample) in cells.into_iter().enumerate() {
            matrix.set_at(offset, sample);
        }
        Ok(matrix)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Sample {
        self.sample_at(self.offset(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, sample: Sample) {
        let offset = self.offset(row, col);
        self.set_at(offset, sample);
    }

    /// Sample at a row-major offset.
    pub fn sample_at(&self, offset: usize) -> Sample {
        self.known[offset].then(|| self.values[offset])
    }

    pub fn set_at(&mut self, offset: usize, sample: Sample) {
        self.known[offset] = sample.is_some();
        self.values[offset] = sample.unwrap_or(0);
    }

    /// Number of cells still marked unknown.
    pub fn unknown_count(&self) -> usize {
        self.known.iter().filter(|&&known| !known).count()
    }

    /// Row-major iterator over all samples.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.values
            .iter()
            .zip(&self.known)
            .map(|(&value, &known)| known.then_some(value))
    }

    pub fn to_samples(&self) -> Vec<Sample> {
        self.samples().collect()
    }

    /// Heap bytes held by the grid buffers.
    pub fn heap_bytes(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<i32>() + self.known.capacity()
    }

    // Out-of-range access is a caller bug, never a recoverable condition.
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}
