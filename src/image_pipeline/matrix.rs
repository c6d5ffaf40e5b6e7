//! Channel matrix storage
//!
//! Fixed-size sample grids and the per-role set of channels that share a shape.

pub mod channel;
pub mod types;

pub use channel::{ChannelKind, ChannelSet};
pub use types::{ChannelMatrix, Sample};
