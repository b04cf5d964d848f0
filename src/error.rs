use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::crypto::CryptoError;

/// Failures surfaced by the embed/extract pipeline.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("payload too large: needs {needed_bits} bits, image holds {available_bits}")]
    CapacityExceeded {
        needed_bits: usize,
        available_bits: usize,
    },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The end marker was never found. `partial` holds every byte recovered
    /// before the pixel grid ran out.
    #[error("end marker not found; recovered {} bytes", .partial.len())]
    DecodeIncomplete { partial: Vec<u8> },
    #[error("payload transform failed: {0}")]
    Transform(#[from] CryptoError),
    #[error("image I/O failed for {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl StegoError {
    /// Best-effort bytes for a soft decode failure, `None` for hard failures.
    pub fn partial_payload(&self) -> Option<&[u8]> {
        match self {
            StegoError::DecodeIncomplete { partial } => Some(partial),
            _ => None,
        }
    }
}
