use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    common::{Cancellation, ReconstructionError, Result},
    compositor::{self, Raster},
    config::ReconstructionConfig,
    distributor::{RoleId, ScatterGather, Tagged},
    loader::{ChannelReader, TextChannelReader},
    matrix::{ChannelKind, ChannelMatrix, ChannelSet},
    reconstruct,
    sink::{ImageOutput, ImageSink, TiffImageSink},
};

/// What a finished run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub width: usize,
    pub height: usize,
    /// Samples filled in from luminance.
    pub reconstructed: usize,
    /// Color samples rendered without a value.
    pub unresolved: usize,
}

/// Loads the four channels on separate producer roles, reconstructs missing colors on
/// the aggregator and renders the result through an [`ImageSink`].
pub struct GalaxyPipeline<R: ChannelReader, S: ImageSink> {
    reader: R,
    sink: S,
    config: ReconstructionConfig,
}

impl GalaxyPipeline<TextChannelReader, TiffImageSink> {
    pub fn new(config: ReconstructionConfig) -> Self {
        Self {
            reader: TextChannelReader,
            sink: TiffImageSink,
            config,
        }
    }
}

impl<R: ChannelReader + Sync, S: ImageSink + Sync> GalaxyPipeline<R, S> {
    pub fn with_custom(reader: R, sink: S, config: ReconstructionConfig) -> Self {
        Self {
            reader,
            sink,
            config,
        }
    }

    fn validate_dimensions(&self) -> Result<()> {
        let (rows, cols) = (self.config.rows, self.config.cols);
        // The encoder takes u32 dimensions.
        let fits = u32::try_from(rows).is_ok() && u32::try_from(cols).is_ok();
        if rows == 0 || cols == 0 || !fits || rows.checked_mul(cols).is_none() {
            return Err(ReconstructionError::InvalidDimensions(rows, cols));
        }
        Ok(())
    }

    /// Producer path: load the owned channel and run the local reconstruction pass.
    fn produce(&self, role: RoleId, kind: ChannelKind, cancel: &Cancellation) -> Result<ChannelMatrix> {
        let _span = tracing::info_span!("producer", role, channel = %kind).entered();

        let path = self.config.sources.path(kind);
        let matrix = {
            let _span = tracing::info_span!("load_channel", path = %path.display()).entered();
            self.reader.read_channel(path, self.config.rows, self.config.cols, cancel)?
        };
        if matrix.dims() != (self.config.rows, self.config.cols) {
            return Err(ReconstructionError::InvalidDimensions(matrix.rows(), matrix.cols()));
        }
        info!(
            unknown = matrix.unknown_count(),
            bytes = matrix.heap_bytes(),
            "Loaded {} channel",
            kind
        );

        let mut local = ChannelSet::new();
        local.insert(kind, matrix);
        reconstruct::reconstruct(&mut local)?;

        local.take(kind).ok_or_else(|| {
            ReconstructionError::TransferFailed(format!("role {role} lost its {kind} channel"))
        })
    }

    /// Aggregator path: merge the gathered blocks, reconstruct and composite.
    fn aggregate(&self, blocks: Vec<Tagged<ChannelKind, ChannelMatrix>>) -> Result<(Raster, RunSummary)> {
        let mut channels = ChannelSet::new();
        for block in blocks {
            channels.insert(block.task, block.payload);
        }

        let report = {
            let _span = tracing::info_span!("reconstruct").entered();
            reconstruct::reconstruct(&mut channels)?
        };

        let missing = |kind: ChannelKind| {
            ReconstructionError::TransferFailed(format!("no {kind} channel was gathered"))
        };
        let composite = {
            let _span = tracing::info_span!("composite").entered();
            compositor::composite(
                channels.get(ChannelKind::Green).ok_or_else(|| missing(ChannelKind::Green))?,
                channels.get(ChannelKind::Blue).ok_or_else(|| missing(ChannelKind::Blue))?,
                channels.get(ChannelKind::Red).ok_or_else(|| missing(ChannelKind::Red))?,
            )?
        };

        if composite.unresolved > 0 {
            warn!(
                unresolved = composite.unresolved,
                cells = report.unresolved,
                "Some color samples could not be reconstructed and render as 0"
            );
            if self.config.strict {
                return Err(ReconstructionError::UnresolvedSamples(composite.unresolved));
            }
        }

        let summary = RunSummary {
            width: composite.raster.width,
            height: composite.raster.height,
            reconstructed: report.filled,
            unresolved: composite.unresolved,
        };
        Ok((composite.raster, summary))
    }

    /// Runs the producer and aggregator roles and returns the composited raster.
    #[instrument(skip(self), fields(rows = self.config.rows, cols = self.config.cols))]
    pub fn assemble(&self) -> Result<(Raster, RunSummary)> {
        self.validate_dimensions()?;

        let topology = ScatterGather::new(ChannelKind::ALL.to_vec());
        info!(
            producers = topology.producers(),
            aggregator = topology.aggregator_role(),
            "Starting reconstruction"
        );

        topology.run(
            |role, kind, cancel| self.produce(role, kind, cancel),
            |blocks| {
                let _span = tracing::info_span!("aggregator").entered();
                self.aggregate(blocks)
            },
        )
    }

    /// Assembles the image and encodes it into `output`.
    pub fn run_to(&self, output: &mut dyn ImageOutput) -> Result<RunSummary> {
        let (raster, summary) = self.assemble()?;

        {
            let _span = tracing::info_span!("encode_image").entered();
            self.sink.write_image(&raster, output, &self.config)?;
        }

        info!(
            width = summary.width,
            height = summary.height,
            reconstructed = summary.reconstructed,
            "Reconstruction complete"
        );
        Ok(summary)
    }

    /// Assembles the image and writes it to the configured output path. The file is only
    /// created once the raster exists.
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<RunSummary> {
        let (raster, summary) = self.assemble()?;
        self.write_file(&raster, &self.config.output)?;

        info!(
            width = summary.width,
            height = summary.height,
            reconstructed = summary.reconstructed,
            output = %self.config.output.display(),
            "Reconstruction complete"
        );
        Ok(summary)
    }

    fn write_file(&self, raster: &Raster, path: &Path) -> Result<()> {
        let _span = tracing::info_span!("encode_image", output = %path.display()).entered();

        let write_error =
            |e: std::io::Error| ReconstructionError::OutputWriteError(format!("{}: {}", path.display(), e));

        let mut output = BufWriter::new(File::create(path).map_err(write_error)?);
        let written = self
            .sink
            .write_image(raster, &mut output, &self.config)
            .and_then(|()| output.flush().map_err(write_error));

        // Never leave a half-written image behind.
        if written.is_err() {
            drop(output);
            let _ = std::fs::remove_file(path);
        }
        written
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReconstructionConfig) {
        self.config = config;
    }
}
