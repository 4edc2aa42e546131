//! Benchmark module
//! Throughput measurements for the codec operations

pub mod cases;
pub mod clock;
pub mod harness;
pub mod report;

pub use cases::{default_cases, sized_cases, SIZE_LADDER};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use harness::{prepare_input, Harness};
pub use report::{write_measurement, Measurement, ReportFormat};

use std::io::Write;

use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// Run the configured table against `clock`
pub fn run_all_benchmarks<C: Clock, W: Write + ?Sized>(
    config: &Config,
    clock: C,
    sink: &mut W,
) -> Result<Vec<Measurement>> {
    config.validate()?;
    let cases = config.test_cases()?;

    info!(
        cases = cases.len(),
        variants = config.variants.len(),
        warmup = config.warmup_iterations,
        "running codec benchmarks"
    );

    Harness::new(clock)
        .with_warmup(config.warmup_iterations)
        .with_format(config.report.format)
        .run(&cases, &config.variants, sink)
}
