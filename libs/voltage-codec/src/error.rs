//! Error types for voltage-codec

use thiserror::Error;

/// Malformed bit-packed payloads.
///
/// Every variant is a format error: the buffer handed to the codec does not
/// match the length-prefixed layout used for coil and discrete-input data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Format error: bit buffer has no byte count")]
    MissingByteCount,

    #[error("Format error: byte count {declared} exceeds {available} available bytes")]
    Truncated { declared: usize, available: usize },

    #[error("Format error: {bytes} payload bytes do not fit a one-byte count")]
    PayloadTooLong { bytes: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
