//! Configuration module

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bench::{sized_cases, ReportFormat};
use crate::codec;
use crate::error::{Error, Result};
use crate::types::{OperationVariant, Payload, TestCase};

/// Environment variable naming the JSON config file
pub const CONFIG_ENV: &str = "B64_BENCH_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/bench.json";

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit test cases, run in order
    pub cases: Vec<CaseConfig>,

    /// Generated pattern cases appended after `cases`
    pub sized: Option<SizedConfig>,

    /// Operations timed for every case
    pub variants: Vec<OperationVariant>,

    /// Untimed calls before each timed loop
    pub warmup_iterations: u64,

    pub report: ReportConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    pub name: String,
    pub payload: PayloadSpec,
    pub iterations: u64,
}

/// Where a case's payload comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadSpec {
    /// `text` repeated `repeat` times; chars must be in U+0000..=U+00FF
    Text {
        text: String,
        #[serde(default = "one")]
        repeat: usize,
    },
    /// Deterministic byte ramp
    Pattern { len: usize },
    /// Payload given in its encoded form
    Base64 { data: String },
}

fn one() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizedConfig {
    pub sizes: Vec<usize>,
    /// Bytes pushed through the codec per case
    pub byte_budget: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    pub json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cases: vec![
                CaseConfig {
                    name: "long".to_string(),
                    payload: PayloadSpec::Text {
                        text: "helloworld".to_string(),
                        repeat: 100_000,
                    },
                    iterations: 100,
                },
                CaseConfig {
                    name: "short".to_string(),
                    payload: PayloadSpec::Text {
                        text: "123".to_string(),
                        repeat: 1,
                    },
                    iterations: 1_000_000,
                },
            ],
            sized: None,
            variants: OperationVariant::ALL.to_vec(),
            warmup_iterations: 0,
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PayloadSpec {
    fn build(&self, case: &str) -> Result<Payload> {
        match self {
            Self::Text { text, repeat } => Payload::repeat(text, *repeat).map_err(|e| {
                Error::config(format!("case `{case}`: payload text: {e}"))
            }),
            Self::Pattern { len } => Ok(Payload::pattern(*len)),
            Self::Base64 { data } => codec::decode(data)
                .map(Payload::from_bytes)
                .map_err(|e| Error::config(format!("case `{case}`: payload is not base64: {e}"))),
        }
    }
}

impl Config {
    /// Load config from environment
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load from file first
        let config_path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Structural checks that do not need payloads built
    pub fn validate(&self) -> Result<()> {
        if self.cases.is_empty() && self.sized.as_ref().map_or(true, |s| s.sizes.is_empty()) {
            return Err(Error::config("no test cases configured"));
        }
        if self.variants.is_empty() {
            return Err(Error::config("no operation variants configured"));
        }
        if let Some(case) = self.cases.iter().find(|c| c.iterations == 0) {
            return Err(Error::config(format!(
                "case `{}`: iteration count must be at least 1",
                case.name
            )));
        }
        if let Some(sized) = &self.sized {
            if sized.byte_budget == 0 {
                return Err(Error::config("sized cases need a non-zero byte budget"));
            }
        }
        Ok(())
    }

    /// Build the test table
    pub fn test_cases(&self) -> Result<Vec<TestCase>> {
        let mut cases = self
            .cases
            .iter()
            .map(|c| TestCase::new(&c.name, c.payload.build(&c.name)?, c.iterations))
            .collect::<Result<Vec<_>>>()?;

        if let Some(sized) = &self.sized {
            cases.extend(sized_cases(&sized.sizes, sized.byte_budget)?);
        }
        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_builtin_table() {
        let config = Config::default();
        config.validate().unwrap();
        let cases = config.test_cases().unwrap();
        let builtin = crate::bench::default_cases().unwrap();
        assert_eq!(cases.len(), builtin.len());
        for (a, b) in cases.iter().zip(&builtin) {
            assert_eq!(a.name(), b.name());
            assert_eq!(a.payload(), b.payload());
            assert_eq!(a.iterations(), b.iterations());
        }
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "cases": [
                { "name": "ab", "payload": { "kind": "text", "text": "AB", "repeat": 10000 }, "iterations": 1000 },
                { "name": "seed", "payload": { "kind": "base64", "data": "Zm9vYmFy" }, "iterations": 10 }
            ],
            "sized": { "sizes": [16, 64], "byte_budget": 1024 },
            "variants": ["encode", "decode"],
            "report": { "format": "json" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.logging.level, "info");

        let cases = config.test_cases().unwrap();
        assert_eq!(cases.len(), 4);
        assert_eq!(cases[0].payload().len(), 20_000);
        assert_eq!(cases[1].payload().as_bytes(), b"foobar");
        assert_eq!(cases[2].name(), "bytes_16");
        assert_eq!(cases[3].iterations().get(), 16);
    }

    #[test]
    fn test_zero_iterations_invalid() {
        let mut config = Config::default();
        config.cases[0].iterations = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_tables_invalid() {
        let mut config = Config::default();
        config.variants.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.cases.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_payloads_invalid() {
        let mut config = Config::default();
        config.cases[0].payload = PayloadSpec::Base64 {
            data: "AB@=".to_string(),
        };
        let err = config.test_cases().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("not base64"));

        config.cases[0].payload = PayloadSpec::Text {
            text: "\u{2603}".to_string(),
            repeat: 1,
        };
        assert!(matches!(config.test_cases(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("b64-bench-config-{}.json", std::process::id()));
        let mut config = Config::default();
        config.warmup_iterations = 7;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.warmup_iterations, 7);
        assert_eq!(loaded.variants, OperationVariant::ALL.to_vec());
        assert_eq!(loaded.cases.len(), 2);
    }
}
