//! Error types for the codec and the benchmark harness

use thiserror::Error;

/// Base64 grammar violations reported by the codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Length (ignoring padding) cannot come from a whole number of bytes.
    #[error("invalid base64 length: {len}")]
    InvalidLength { len: usize },

    #[error("invalid base64 character {byte:#04x} at offset {index}")]
    InvalidCharacter { index: usize, byte: u8 },

    /// `=` somewhere other than a one or two character suffix.
    #[error("misplaced padding at offset {index}")]
    InvalidPadding { index: usize },

    /// Final group carries non-zero bits that no encoder would emit.
    #[error("non-zero trailing bits at offset {index}")]
    TrailingBits { index: usize },

    /// Text input holds a char that does not fit in one byte.
    #[error("character {ch:?} at offset {index} is outside U+0000..=U+00FF")]
    CharOutOfRange { index: usize, ch: char },

    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputTooSmall { needed: usize, available: usize },
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(#[from] CodecError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("monotonic clock unavailable: {0}")]
    ClockUnavailable(String),

    #[error("report sink failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
