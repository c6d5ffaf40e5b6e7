//! Common utilities module
//!
//! This module contains shared utilities used across the image pipeline.

pub mod cancel;
pub mod error;

pub use cancel::Cancellation;
pub use error::{ReconstructionError, Result};
