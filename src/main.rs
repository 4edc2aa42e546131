//! Base64 benchmark CLI
//!
//! `b64-bench [run]` times the configured table, `b64-bench encode <text>`
//! and `b64-bench decode <base64>` expose the codec directly.

use std::env;
use std::io;

use anyhow::{anyhow, bail, Context};
use b64_core::codec;
use b64_core::config::LoggingConfig;
use b64_core::{Config, MonotonicClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    init_tracing(&config.logging)?;

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("run") => run(&config),
        Some("encode") => {
            let text = args.get(1).context("usage: b64-bench encode <text>")?;
            println!("{}", codec::encode_text(text)?);
            Ok(())
        }
        Some("decode") => {
            let input = args.get(1).context("usage: b64-bench decode <base64>")?;
            let bytes = codec::decode(input)?;
            match String::from_utf8(bytes) {
                Ok(text) => println!("{text}"),
                Err(e) => println!("{}", hex::encode(e.into_bytes())),
            }
            Ok(())
        }
        Some(other) => bail!("unknown command `{other}` (expected run, encode or decode)"),
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    info!("b64-bench v{}", env!("CARGO_PKG_VERSION"));
    let clock = MonotonicClock::new()?;

    let stdout = io::stdout();
    let mut sink = stdout.lock();
    let results = b64_core::run_all_benchmarks(config, clock, &mut sink)?;

    info!(measurements = results.len(), "benchmarks complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("invalid log level `{}`", logging.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    let installed = if logging.json_output {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
