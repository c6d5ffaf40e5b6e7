//! Plain-text channel reader.
//!
//! A channel file holds exactly `rows * cols` whitespace-separated tokens in row-major
//! order. Line breaks carry no meaning, so a file may put one row per line or everything
//! on a single line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::image_pipeline::common::{Cancellation, ReconstructionError, Result};
use crate::image_pipeline::loader::reader::ChannelReader;
use crate::image_pipeline::matrix::{ChannelMatrix, Sample};

/// Token standing for a sample that is not known.
pub const UNKNOWN_TOKEN: &str = "*";

const READ_BUFFER_BYTES: usize = 1 << 20;

/// Samples parsed between two cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 1 << 16;

/// Reads channel files from the local filesystem.
pub struct TextChannelReader;

impl ChannelReader for TextChannelReader {
    /// Opens `path` and parses a `rows` x `cols` channel from it.
    ///
    /// # Returns
    ///
    /// * `Err(SourceUnavailable)` - the file could not be opened
    /// * `Err(SourceMalformed)` - too few tokens, or a token that is neither `*` nor a number
    /// * `Err(Cancelled)` - another role failed while this file was being parsed
    fn read_channel(&self, path: &Path, rows: usize, cols: usize, cancel: &Cancellation) -> Result<ChannelMatrix> {
        debug!("Opening channel source {}", path.display());

        let file = File::open(path).map_err(|e| {
            ReconstructionError::SourceUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let mut input = BufReader::with_capacity(READ_BUFFER_BYTES, file);

        parse_channel(&mut input, rows, cols, cancel).map_err(|e| match e {
            ReconstructionError::SourceMalformed(reason) => {
                ReconstructionError::SourceMalformed(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }
}

/// Parses a `rows` x `cols` channel from a token stream.
pub fn parse_channel(
    input: &mut dyn BufRead,
    rows: usize,
    cols: usize,
    cancel: &Cancellation,
) -> Result<ChannelMatrix> {
    let expected = rows * cols;
    let mut matrix = ChannelMatrix::unknown(rows, cols);
    let mut parsed = 0;
    let mut line = String::new();

    while parsed < expected {
        if cancel.is_cancelled() {
            return Err(ReconstructionError::Cancelled);
        }

        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| ReconstructionError::SourceMalformed(format!("read failed: {e}")))?;
        if read == 0 {
            break;
        }

        let mut tokens = line.split_ascii_whitespace();
        for token in tokens.by_ref() {
            matrix.set_at(parsed, parse_token(token, parsed, cols)?);
            parsed += 1;
            if parsed == expected {
                break;
            }
            // A whole grid on one line must still notice cancellation.
            if parsed % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(ReconstructionError::Cancelled);
            }
        }

        if tokens.next().is_some() {
            debug!("Ignoring tokens past the {} expected samples", expected);
        }
    }

    if parsed < expected {
        return Err(ReconstructionError::SourceMalformed(format!(
            "expected {} samples, found {}",
            expected, parsed
        )));
    }

    Ok(matrix)
}

// Samples are stored as integers; fractional input truncates toward zero.
fn parse_token(token: &str, index: usize, cols: usize) -> Result<Sample> {
    if token == UNKNOWN_TOKEN {
        return Ok(None);
    }

    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value as i32)),
        _ => Err(ReconstructionError::SourceMalformed(format!(
            "token `{}` at ({}, {}) is not a number",
            token,
            index / cols,
            index % cols
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};

    fn parse(text: &str, rows: usize, cols: usize) -> Result<ChannelMatrix> {
        parse_channel(&mut Cursor::new(text.as_bytes()), rows, cols, &Cancellation::new())
    }

    #[test]
    fn test_marker_maps_to_unknown() {
        let matrix = parse("1 2 3\n4 * 6\n", 2, 3).unwrap();
        assert_eq!(matrix.get(1, 1), None);
        assert_eq!(matrix.get(1, 2), Some(6));
        assert_eq!(matrix.unknown_count(), 1);
    }

    #[test]
    fn test_layout_ignores_line_breaks() {
        let matrix = parse("1 2\n3\n\n   4 5 6", 2, 3).unwrap();
        assert_eq!(matrix.get(0, 2), Some(3));
        assert_eq!(matrix.get(1, 0), Some(4));
    }

    #[test]
    fn test_real_numbers_truncate_toward_zero() {
        let matrix = parse("12.9 -3.7 1e2 0", 2, 2).unwrap();
        assert_eq!(matrix.to_samples(), vec![Some(12), Some(-3), Some(100), Some(0)]);
    }

    #[test]
    fn test_short_stream_is_malformed() {
        let result = parse("1 2 3", 2, 2);
        assert!(matches!(result, Err(ReconstructionError::SourceMalformed(_))));
    }

    #[test]
    fn test_non_numeric_token_is_malformed() {
        let err = parse("1 2 x 4", 2, 2).unwrap_err();
        match err {
            ReconstructionError::SourceMalformed(reason) => assert!(reason.contains("(1, 0)")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse("1 2 nan 4", 2, 2).is_err());
        assert!(parse("1 2 ** 4", 2, 2).is_err());
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        let matrix = parse("1 2 3 4 5\n6 7", 2, 2).unwrap();
        assert_eq!(matrix.to_samples(), vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = TextChannelReader.read_channel(&dir.path().join("absent.txt"), 1, 1, &Cancellation::new());
        assert!(matches!(result, Err(ReconstructionError::SourceUnavailable(_))));
    }

    #[test]
    fn test_malformed_file_names_its_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1 * 3").unwrap();

        let err = TextChannelReader.read_channel(file.path(), 2, 2, &Cancellation::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_cancelled_parse_stops_before_reading() {
        let cancel = Cancellation::new();
        cancel.cancel();

        let result = parse_channel(&mut Cursor::new(b"1 2 3 4".as_slice()), 2, 2, &cancel);

        assert!(matches!(result, Err(ReconstructionError::Cancelled)));
    }

    /// Raises the flag as soon as the parser pulls bytes, i.e. after its first check.
    struct CancelOnRead {
        inner: Cursor<Vec<u8>>,
        cancel: Cancellation,
    }

    impl Read for CancelOnRead {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.cancel.cancel();
            self.inner.read(buf)
        }
    }

    impl BufRead for CancelOnRead {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            self.cancel.cancel();
            self.inner.fill_buf()
        }

        fn consume(&mut self, amount: usize) {
            self.inner.consume(amount)
        }
    }

    #[test]
    fn test_cancellation_is_seen_within_a_single_line() {
        let cols = CANCEL_CHECK_INTERVAL * 2;
        let cancel = Cancellation::new();
        let mut input = CancelOnRead {
            inner: Cursor::new(vec!["7"; cols].join(" ").into_bytes()),
            cancel: cancel.clone(),
        };

        let result = parse_channel(&mut input, 1, cols, &cancel);

        assert!(matches!(result, Err(ReconstructionError::Cancelled)));
    }
}
