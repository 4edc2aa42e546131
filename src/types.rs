//! Core types shared by the codec benchmarks

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{Error, Result};

/// Immutable benchmark input, one byte per code unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Box<[u8]>);

impl Payload {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into().into_boxed_slice())
    }

    /// Payload from text whose chars are all in U+0000..=U+00FF
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::from_bytes(codec::to_latin1(text)?))
    }

    /// `text` repeated `count` times
    pub fn repeat(text: &str, count: usize) -> Result<Self> {
        Ok(Self::from_bytes(codec::to_latin1(text)?.repeat(count)))
    }

    /// Deterministic byte ramp of `len` bytes covering most byte values
    pub fn pattern(len: usize) -> Self {
        let mut bytes = Vec::with_capacity(len);
        let mut next = 0u8;
        for _ in 0..len {
            bytes.push(next);
            next = if next == 250 { 0 } else { next + 1 };
        }
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Codec operation timed by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationVariant {
    Encode,
    /// Decode of the pre-encoded payload
    Decode,
    /// Encode followed by decode of the result
    #[serde(rename = "roundtrip", alias = "encode_decode")]
    RoundTrip,
}

impl OperationVariant {
    pub const ALL: [OperationVariant; 3] = [Self::RoundTrip, Self::Encode, Self::Decode];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
            Self::RoundTrip => "roundtrip",
        }
    }
}

impl fmt::Display for OperationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A payload and how many times to run each operation over it
#[derive(Debug, Clone)]
pub struct TestCase {
    name: String,
    payload: Payload,
    iterations: NonZeroU64,
}

impl TestCase {
    pub fn new(name: impl Into<String>, payload: Payload, iterations: u64) -> Result<Self> {
        let name = name.into();
        let iterations = NonZeroU64::new(iterations)
            .ok_or_else(|| Error::config(format!("case `{name}`: iteration count must be at least 1")))?;
        Ok(Self {
            name,
            payload,
            iterations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn iterations(&self) -> NonZeroU64 {
        self.iterations
    }
}
