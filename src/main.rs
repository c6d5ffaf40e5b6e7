use std::path::PathBuf;

use anyhow::{bail, ensure};
use galaxy_recon::image_pipeline::{ChannelSources, GalaxyPipeline, ReconstructionConfig};
use galaxy_recon::logger;

use tracing::{error, info};

/// Exit status for a bad command line, kept apart from the pipeline's error classes.
const USAGE_EXIT_CODE: i32 = 64;

/// Resolves the channel directory from the command line, defaulting to the working directory.
fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<PathBuf> {
    let input_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    if args.next().is_some() {
        bail!("usage: galaxy_recon [CHANNEL_DIR]");
    }
    ensure!(input_dir.is_dir(), "{} is not a directory", input_dir.display());
    Ok(input_dir)
}

fn main() {
    logger::init();

    let input_dir = match parse_args(std::env::args().skip(1)) {
        Ok(dir) => dir,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    info!("Starting galaxy_recon...");

    let config = ReconstructionConfig::builder()
        .sources(ChannelSources::in_dir(&input_dir))
        .output(input_dir.join(galaxy_recon::image_pipeline::config::DEFAULT_OUTPUT))
        .build();
    let pipeline = GalaxyPipeline::new(config);

    info!("Grid: {}x{}", pipeline.config().cols, pipeline.config().rows);
    info!("Compression: {:?}", pipeline.config().compression);

    match pipeline.run() {
        Ok(summary) => {
            info!(
                "Reconstruction successful: {} samples filled, {} unresolved",
                summary.reconstructed, summary.unresolved
            );
        }
        Err(e) => {
            error!("Reconstruction failed: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_recon::image_pipeline::ReconstructionError;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_directory_argument_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        assert_eq!(parse_args(args(&[path])).unwrap(), dir.path());
    }

    #[test]
    fn test_no_argument_uses_working_directory() {
        assert_eq!(parse_args(args(&[])).unwrap(), PathBuf::from("."));
    }

    #[test]
    fn test_extra_argument_is_a_usage_error() {
        let err = parse_args(args(&[".", "extra"])).unwrap_err();
        assert!(err.to_string().starts_with("usage:"));
    }

    #[test]
    fn test_file_is_not_a_channel_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let err = parse_args(args(&[path])).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_usage_code_is_distinct_from_pipeline_codes() {
        let errors = [
            ReconstructionError::SourceUnavailable(String::new()),
            ReconstructionError::SourceMalformed(String::new()),
            ReconstructionError::TransferFailed(String::new()),
            ReconstructionError::Cancelled,
            ReconstructionError::OutputWriteError(String::new()),
            ReconstructionError::EncodeError(String::new()),
            ReconstructionError::UnresolvedSamples(1),
            ReconstructionError::InvalidDimensions(0, 0),
        ];
        for e in &errors {
            assert_ne!(e.exit_code(), USAGE_EXIT_CODE, "{e}");
        }
    }
}
