//! Base64 codec and throughput benchmark harness
//!
//! ## Architecture
//! - Codec: strict standard-alphabet base64, plus a forgiving decoder
//! - Bench: injected clock, timed loops over a case × variant table, reports
//! - Config: JSON-backed test table and logging settings

pub mod bench;
pub mod codec;
pub mod config;
pub mod error;
pub mod types;

pub use bench::{run_all_benchmarks, Clock, Harness, Measurement, MonotonicClock, ReportFormat};
pub use codec::{decode, encode, forgiving_decode};
pub use config::Config;
pub use error::{CodecError, Error, Result};
pub use types::{OperationVariant, Payload, TestCase};
