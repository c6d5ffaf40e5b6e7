//! Reconstruction configuration types

use std::path::{Path, PathBuf};

use crate::image_pipeline::matrix::ChannelKind;
use crate::image_pipeline::sink::TiffCompression;

/// Grid rows of the reference deployment.
pub const GRID_ROWS: usize = 7121;
/// Grid columns of the reference deployment.
pub const GRID_COLS: usize = 10681;

pub const DEFAULT_OUTPUT: &str = "galaxy.tiff";

/// Where each channel is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSources {
    pub green: PathBuf,
    pub blue: PathBuf,
    pub red: PathBuf,
    pub luminance: PathBuf,
}

impl ChannelSources {
    /// Conventional file names (`green.txt`, `blue.txt`, ...) inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            green: dir.join(Self::file_name(ChannelKind::Green)),
            blue: dir.join(Self::file_name(ChannelKind::Blue)),
            red: dir.join(Self::file_name(ChannelKind::Red)),
            luminance: dir.join(Self::file_name(ChannelKind::Luminance)),
        }
    }

    pub fn path(&self, kind: ChannelKind) -> &Path {
        match kind {
            ChannelKind::Green => &self.green,
            ChannelKind::Blue => &self.blue,
            ChannelKind::Red => &self.red,
            ChannelKind::Luminance => &self.luminance,
        }
    }

    fn file_name(kind: ChannelKind) -> String {
        format!("{}.txt", kind.name())
    }
}

impl Default for ChannelSources {
    fn default() -> Self {
        Self::in_dir("")
    }
}

/// Configuration for a reconstruction run
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Grid height shared by all four channels
    pub rows: usize,
    /// Grid width shared by all four channels
    pub cols: usize,
    pub sources: ChannelSources,
    /// Image written by [`run`](crate::image_pipeline::GalaxyPipeline::run)
    pub output: PathBuf,
    pub compression: TiffCompression,
    /// Predictor value for compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
    /// Fail the run instead of rendering unreconstructed samples as black
    pub strict: bool,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            sources: ChannelSources::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            compression: TiffCompression::None,
            predictor: None,
            strict: false,
        }
    }
}

impl ReconstructionConfig {
    pub fn builder() -> ReconstructionConfigBuilder {
        ReconstructionConfigBuilder::default()
    }
}

/// Builder for ReconstructionConfig
#[derive(Default)]
pub struct ReconstructionConfigBuilder {
    dims: Option<(usize, usize)>,
    sources: Option<ChannelSources>,
    output: Option<PathBuf>,
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    strict: Option<bool>,
}

impl ReconstructionConfigBuilder {
    pub fn dims(mut self, rows: usize, cols: usize) -> Self {
        self.dims = Some((rows, cols));
        self
    }

    pub fn sources(mut self, sources: ChannelSources) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn build(self) -> ReconstructionConfig {
        let default = ReconstructionConfig::default();
        let (rows, cols) = self.dims.unwrap_or((default.rows, default.cols));
        ReconstructionConfig {
            rows,
            cols,
            sources: self.sources.unwrap_or(default.sources),
            output: self.output.unwrap_or(default.output),
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            strict: self.strict.unwrap_or(default.strict),
        }
    }
}
