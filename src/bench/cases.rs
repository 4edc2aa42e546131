//! Built-in benchmark tables

use crate::error::{Error, Result};
use crate::types::{Payload, TestCase};

/// Payload sizes swept by the sized table
pub const SIZE_LADDER: [usize; 7] = [16, 32, 64, 256, 1024, 4096, 64 * 1024];

/// The classic long/short pair: a megabyte of text run a hundred times and
/// a three byte string run a million times.
pub fn default_cases() -> Result<Vec<TestCase>> {
    Ok(vec![
        TestCase::new("long", Payload::repeat("helloworld", 100_000)?, 100)?,
        TestCase::new("short", Payload::from_text("123")?, 1_000_000)?,
    ])
}

/// One pattern payload per size, each run often enough to push roughly
/// `byte_budget` bytes through the codec.
pub fn sized_cases(sizes: &[usize], byte_budget: u64) -> Result<Vec<TestCase>> {
    sizes
        .iter()
        .map(|&size| {
            if size == 0 {
                return Err(Error::config("sized case with zero-length payload"));
            }
            let iterations = (byte_budget / size as u64).max(1);
            TestCase::new(format!("bytes_{size}"), Payload::pattern(size), iterations)
        })
        .collect()
}
