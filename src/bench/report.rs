//! Measurements and their report lines

use std::fmt;
use std::io::Write;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::OperationVariant;

const NANOS_PER_SEC: f64 = 1e9;

/// Outcome of one timed loop
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub case: String,
    pub variant: OperationVariant,
    pub payload_len: usize,
    pub iterations: NonZeroU64,
    pub elapsed_ns: u64,
}

impl Measurement {
    /// Elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ns as f64 / NANOS_PER_SEC
    }

    /// Operations per second.
    ///
    /// A zero-length interval counts as one nanosecond so the result stays
    /// finite.
    pub fn frequency(&self) -> f64 {
        let secs = self.elapsed_ns.max(1) as f64 / NANOS_PER_SEC;
        self.iterations.get() as f64 / secs
    }

    /// Mean seconds per operation
    pub fn time_per_op_secs(&self) -> f64 {
        self.elapsed_secs() / self.iterations.get() as f64
    }

    /// Mean nanoseconds per operation
    pub fn time_per_op_ns(&self) -> f64 {
        self.elapsed_ns as f64 / self.iterations.get() as f64
    }

    /// Payload bytes processed per second
    pub fn bytes_per_sec(&self) -> f64 {
        self.frequency() * self.payload_len as f64
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.case, self.variant)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "case": self.case,
            "variant": self.variant,
            "payload_len": self.payload_len,
            "iterations": self.iterations.get(),
            "elapsed_ns": self.elapsed_ns,
            "dt_secs": self.elapsed_secs(),
            "freq_per_sec": self.frequency(),
            "time_ns_per_op": self.time_per_op_ns(),
        })
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} | len: {:>8} | n: {:>8} | dt: {:>8.3}s | freq: {:>15.3}/s | time: {:>10.0}ns/op",
            self.label(),
            self.payload_len,
            self.iterations,
            self.elapsed_secs(),
            self.frequency(),
            self.time_per_op_ns(),
        )
    }
}

/// Report line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One aligned human-readable line per measurement
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Write one report line for `m`
pub fn write_measurement<W: Write + ?Sized>(
    sink: &mut W,
    m: &Measurement,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Text => writeln!(sink, "{m}")?,
        ReportFormat::Json => {
            serde_json::to_writer(&mut *sink, &m.to_json())?;
            writeln!(sink)?;
        }
    }
    Ok(())
}
