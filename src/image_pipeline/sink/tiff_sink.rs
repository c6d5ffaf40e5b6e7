use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{colortype, Compression, TiffEncoder};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::compositor::{Raster, BYTES_PER_PIXEL};
use crate::image_pipeline::config::ReconstructionConfig;
use crate::image_pipeline::sink::types::TiffCompression;
use crate::image_pipeline::sink::writer::{ImageOutput, ImageSink};

/// Encodes rasters as 8-bit RGBA TIFF, one strip at a time straight into the output.
pub struct TiffImageSink;

impl ImageSink for TiffImageSink {
    fn write_image(&self, raster: &Raster, output: &mut dyn ImageOutput, config: &ReconstructionConfig) -> Result<()> {
        debug!("Encoding TIFF image: {}x{}", raster.width, raster.height);

        if raster.data.len() != raster.width * raster.height * BYTES_PER_PIXEL {
            return Err(ReconstructionError::InvalidDimensions(raster.height, raster.width));
        }

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(output)
            .map_err(|e| ReconstructionError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let mut image = encoder
            .new_image::<colortype::RGBA8>(raster.width as u32, raster.height as u32)
            .map_err(|e| ReconstructionError::EncodeError(e.to_string()))?;

        // TIFF stores RGBA; the raster is BGRA. Only one strip is swizzled at a time.
        let mut strip = Vec::new();
        let mut offset = 0;
        loop {
            let samples = image.next_strip_sample_count() as usize;
            if samples == 0 {
                break;
            }
            let bgra = &raster.data[offset..offset + samples];
            strip.clear();
            strip.extend(bgra.chunks_exact(BYTES_PER_PIXEL).flat_map(|px| [px[2], px[1], px[0], px[3]]));
            image
                .write_strip(&strip)
                .map_err(|e| ReconstructionError::EncodeError(e.to_string()))?;
            offset += samples;
        }

        image
            .finish()
            .map_err(|e| ReconstructionError::EncodeError(e.to_string()))?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
