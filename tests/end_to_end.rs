use std::fs;
use std::io::Cursor;
use std::path::Path;

use galaxy_recon::image_pipeline::{
    ChannelKind, ChannelSources, GalaxyPipeline, ReconstructionConfig, ReconstructionError,
    TiffCompression,
};
use tiff::decoder::{Decoder, DecodingResult};

/// Writes the four channel files for a 2x3 grid into `dir`.
///
/// Every cell is consistent with luminance = 0.3 R + 0.59 G + 0.11 B, and every
/// cell hides exactly one color behind `*`.
fn write_channels(dir: &Path) {
    let files = [
        (ChannelKind::Green, "* 100 200\n100 * 0\n"),
        (ChannelKind::Blue, "100 * 100\n200 0 *\n"),
        (ChannelKind::Red, "100 100 *\n* 200 200\n"),
        (ChannelKind::Luminance, "100 100 159\n81 119 71\n"),
    ];
    let sources = ChannelSources::in_dir(dir);
    for (kind, text) in files {
        fs::write(sources.path(kind), text).unwrap();
    }
}

fn config(dir: &Path) -> ReconstructionConfig {
    ReconstructionConfig::builder()
        .dims(2, 3)
        .sources(ChannelSources::in_dir(dir))
        .output(dir.join("galaxy.tiff"))
        .build()
}

fn decode(bytes: Vec<u8>) -> (u32, u32, Vec<u8>) {
    let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
    let (width, height) = decoder.dimensions().unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::U8(data) => (width, height, data),
        _ => panic!("expected 8-bit samples"),
    }
}

fn assert_rgba_close(actual: &[u8], expected: [u8; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.abs_diff(e) <= 1, "pixel {actual:?}, expected {expected:?}");
    }
}

#[test]
fn reconstructs_and_writes_tiff() {
    let dir = tempfile::tempdir().unwrap();
    write_channels(dir.path());

    let pipeline = GalaxyPipeline::new(config(dir.path()));
    let summary = pipeline.run().unwrap();

    assert_eq!((summary.width, summary.height), (3, 2));
    assert_eq!(summary.reconstructed, 6);
    assert_eq!(summary.unresolved, 0);

    let (width, height, data) = decode(fs::read(dir.path().join("galaxy.tiff")).unwrap());
    assert_eq!((width, height), (3, 2));

    let expected: [[u8; 4]; 6] = [
        [100, 100, 100, 255],
        [100, 100, 100, 255],
        [100, 200, 100, 255],
        [0, 100, 200, 255],
        [200, 100, 0, 255],
        [200, 0, 100, 255],
    ];
    for (pixel, expected) in data.chunks_exact(4).zip(expected) {
        assert_rgba_close(pixel, expected);
    }
}

#[test]
fn compressed_output_matches_uncompressed() {
    let dir = tempfile::tempdir().unwrap();
    write_channels(dir.path());

    let plain = GalaxyPipeline::new(config(dir.path()));
    let mut plain_bytes = Cursor::new(Vec::<u8>::new());
    plain.run_to(&mut plain_bytes).unwrap();

    let mut compressed_config = config(dir.path());
    compressed_config.compression = TiffCompression::DeflateBalanced;
    compressed_config.predictor = Some(2);
    let compressed = GalaxyPipeline::new(compressed_config);
    let mut compressed_bytes = Cursor::new(Vec::<u8>::new());
    compressed.run_to(&mut compressed_bytes).unwrap();

    assert_eq!(decode(plain_bytes.into_inner()).2, decode(compressed_bytes.into_inner()).2);
}

#[test]
fn missing_channel_file_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    write_channels(dir.path());
    fs::remove_file(dir.path().join("red.txt")).unwrap();

    let err = GalaxyPipeline::new(config(dir.path())).run().unwrap_err();

    assert!(matches!(err, ReconstructionError::SourceUnavailable(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(!dir.path().join("galaxy.tiff").exists());
}

#[test]
fn short_channel_file_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    write_channels(dir.path());
    fs::write(dir.path().join("luminance.txt"), "100 100 159\n81 119\n").unwrap();

    let err = GalaxyPipeline::new(config(dir.path())).run().unwrap_err();

    assert!(matches!(err, ReconstructionError::SourceMalformed(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!dir.path().join("galaxy.tiff").exists());
}

#[test]
fn unwritable_output_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_channels(dir.path());

    let mut config = config(dir.path());
    config.output = dir.path().join("missing").join("galaxy.tiff");
    let err = GalaxyPipeline::new(config).run().unwrap_err();

    assert!(matches!(err, ReconstructionError::OutputWriteError(_)));
}
