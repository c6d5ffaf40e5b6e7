//! Channel loading module
//!
//! Reads whitespace-delimited sample streams into channel matrices. The `*` token marks
//! a sample that has to be reconstructed later.

mod reader;
mod text_reader;

pub use reader::ChannelReader;
pub use text_reader::{parse_channel, TextChannelReader, UNKNOWN_TOKEN};
