//! Galaxy image reconstruction pipeline
//!
//! Four channel matrices (green, blue, red, luminance) are loaded by independent
//! producer roles and merged on one aggregator role. The aggregator fills in the single
//! missing color per pixel from luminance and renders an RGBA image through an image sink.

pub mod common;
pub mod compositor;
pub mod config;
pub mod distributor;
mod galaxy;
pub mod loader;
pub mod matrix;
pub mod reconstruct;
pub mod sink;


pub use common::{Cancellation, ReconstructionError, Result};

pub use config::{
    ChannelSources, ReconstructionConfig, ReconstructionConfigBuilder, GRID_COLS, GRID_ROWS,
};

pub use matrix::{ChannelKind, ChannelMatrix, ChannelSet, Sample};

pub use loader::{ChannelReader, TextChannelReader};

pub use reconstruct::{reconstruct, ReconstructionReport};

pub use distributor::{ScatterGather, Tagged};

pub use compositor::{composite, Composite, Raster};

pub use sink::{ImageOutput, ImageSink, TiffCompression, TiffImageSink};

pub use galaxy::{GalaxyPipeline, RunSummary};
