use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconstructionError {
    #[error("Failed to open channel source: {0}")]
    SourceUnavailable(String),

    #[error("Malformed channel source: {0}")]
    SourceMalformed(String),

    #[error("Channel transfer did not complete: {0}")]
    TransferFailed(String),

    #[error("Run cancelled after another role failed")]
    Cancelled,

    #[error("{0} samples could not be reconstructed")]
    UnresolvedSamples(usize),

    #[error("Invalid grid dimensions: rows={0}, cols={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReconstructionError {
    /// Process exit status for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceUnavailable(_) => 1,
            Self::SourceMalformed(_) => 2,
            Self::TransferFailed(_) | Self::Cancelled => 3,
            Self::EncodeError(_) | Self::OutputWriteError(_) | Self::IoError(_) => 4,
            Self::UnresolvedSamples(_) => 5,
            Self::InvalidDimensions(_, _) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconstructionError>;
