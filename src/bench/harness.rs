//! Timed loops over the codec
//!
//! Each (case, variant) pair gets one loop: inputs are prepared first, the
//! clock is read, the operation runs `iterations` times with every result
//! fed to `black_box`, and the clock is read again. Nothing else happens
//! between the two reads.

use std::borrow::Cow;
use std::collections::HashMap;
use std::hint::black_box;
use std::io::Write;
use std::num::NonZeroU64;

use tracing::{debug, info};

use super::clock::Clock;
use super::report::{write_measurement, Measurement, ReportFormat};
use crate::codec;
use crate::error::{CodecError, Result};
use crate::types::{OperationVariant, TestCase};

/// Benchmark driver bound to one clock
#[derive(Debug)]
pub struct Harness<C> {
    clock: C,
    warmup_iterations: u64,
    format: ReportFormat,
}

impl<C: Clock> Harness<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            warmup_iterations: 0,
            format: ReportFormat::Text,
        }
    }

    /// Untimed calls made before the start timestamp
    pub fn with_warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Time `variant` over `case`
    pub fn measure(&self, case: &TestCase, variant: OperationVariant) -> Result<Measurement> {
        let input = prepare_input(case, variant);
        let input: &[u8] = &input;

        debug!(
            case = case.name(),
            %variant,
            len = case.payload().len(),
            iterations = case.iterations().get(),
            "timing"
        );

        let elapsed_ns = match variant {
            OperationVariant::Encode => {
                self.run_timed(case.iterations(), || Ok(codec::encode(black_box(input))))?
            }
            OperationVariant::Decode => {
                self.run_timed(case.iterations(), || codec::decode(black_box(input)))?
            }
            OperationVariant::RoundTrip => self.run_timed(case.iterations(), || {
                codec::decode(codec::encode(black_box(input)))
            })?,
        };

        Ok(Measurement {
            case: case.name().to_string(),
            variant,
            payload_len: case.payload().len(),
            iterations: case.iterations(),
            elapsed_ns,
        })
    }

    /// Run every case under every variant, writing one report line per
    /// measurement to `sink`.
    pub fn run<W: Write + ?Sized>(
        &self,
        cases: &[TestCase],
        variants: &[OperationVariant],
        sink: &mut W,
    ) -> Result<Vec<Measurement>> {
        let mut results = Vec::with_capacity(cases.len() * variants.len());

        for case in cases {
            for &variant in variants {
                let m = self.measure(case, variant)?;
                write_measurement(sink, &m, self.format)?;
                results.push(m);
            }
        }
        sink.flush()?;

        log_summary(&results);
        Ok(results)
    }

    fn run_timed<T, F>(&self, iterations: NonZeroU64, mut f: F) -> Result<u64>
    where
        F: FnMut() -> std::result::Result<T, CodecError>,
    {
        for _ in 0..self.warmup_iterations {
            black_box(f()?);
        }

        let start = self.clock.now_ns();
        for _ in 0..iterations.get() {
            black_box(f()?);
        }
        let end = self.clock.now_ns();

        Ok(end.saturating_sub(start))
    }
}

/// Input handed to the timed operation: the payload itself, or for the
/// decode variant its encoding, computed here so the timed region only
/// measures decoding.
pub fn prepare_input(case: &TestCase, variant: OperationVariant) -> Cow<'_, [u8]> {
    match variant {
        OperationVariant::Encode | OperationVariant::RoundTrip => {
            Cow::Borrowed(case.payload().as_bytes())
        }
        OperationVariant::Decode => Cow::Owned(codec::encode(case.payload()).into_bytes()),
    }
}

const MIB: f64 = 1024.0 * 1024.0;

/// Aggregate throughput per variant
fn log_summary(results: &[Measurement]) {
    let mut totals: HashMap<OperationVariant, (f64, u64)> = HashMap::new();
    for m in results {
        let entry = totals.entry(m.variant).or_default();
        entry.0 += m.payload_len as f64 * m.iterations.get() as f64;
        entry.1 += m.elapsed_ns;
    }

    for variant in OperationVariant::ALL {
        if let Some(&(bytes, ns)) = totals.get(&variant) {
            let secs = ns.max(1) as f64 / 1e9;
            info!(%variant, mib_per_sec = bytes / secs / MIB, "throughput");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::clock::{ManualClock, MonotonicClock};
    use crate::error::Error;
    use crate::types::Payload;

    fn ab_case() -> TestCase {
        TestCase::new("ab", Payload::repeat("AB", 10_000).unwrap(), 1000).unwrap()
    }

    #[test]
    fn test_encode_end_to_end() {
        let harness = Harness::new(MonotonicClock::new().unwrap());
        let mut sink = Vec::new();
        let results = harness
            .run(&[ab_case()], &[OperationVariant::Encode], &mut sink)
            .unwrap();

        let report = String::from_utf8(sink).unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.contains("1000"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].iterations.get(), 1000);
        assert_eq!(results[0].payload_len, 20_000);
        assert!(results[0].elapsed_secs() >= 0.0);
    }

    #[test]
    fn test_elapsed_comes_from_clock() {
        let harness = Harness::new(ManualClock::new(0, 2_000_000_000)).with_warmup(3);
        let case = TestCase::new("short", Payload::from_text("123").unwrap(), 100).unwrap();
        let m = harness.measure(&case, OperationVariant::RoundTrip).unwrap();
        assert_eq!(m.elapsed_ns, 2_000_000_000);
        assert_eq!(m.frequency(), 50.0);
        assert_eq!(m.time_per_op_secs(), 0.02);
    }

    #[test]
    fn test_decode_seed_is_encoded_payload() {
        let case = ab_case();
        let seed = prepare_input(&case, OperationVariant::Decode);
        assert_eq!(&*seed, codec::encode(case.payload()).as_bytes());
        assert_eq!(codec::decode(&*seed).unwrap(), case.payload().as_bytes());

        let plain = prepare_input(&case, OperationVariant::Encode);
        assert!(matches!(plain, Cow::Borrowed(_)));
    }

    #[test]
    fn test_full_matrix() {
        let harness = Harness::new(ManualClock::new(0, 1_000)).with_format(ReportFormat::Json);
        let cases = vec![
            ab_case(),
            TestCase::new("empty", Payload::pattern(0), 5).unwrap(),
        ];
        let mut sink = Vec::new();
        let results = harness.run(&cases, &OperationVariant::ALL, &mut sink).unwrap();
        assert_eq!(results.len(), 6);

        let lines: Vec<serde_json::Value> = sink
            .split(|&b| b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_slice(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0]["case"], "ab");
        assert_eq!(lines[0]["variant"], "roundtrip");
        assert_eq!(lines[5]["case"], "empty");
        assert_eq!(lines[5]["elapsed_ns"], 1_000);
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_surfaces() {
        let harness = Harness::new(ManualClock::new(0, 1));
        let err = harness
            .run(&[ab_case()], &[OperationVariant::Encode], &mut FailingSink)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
