use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Longest accepted mismatch delay, matching the web server's cap.
pub const MAX_MISMATCH_DELAY_MS: u64 = 10_000;

pub const CONFIG_ENV: &str = "PAIRS_CONFIG";
pub const SEED_ENV: &str = "PAIRS_SEED";
pub const DELAY_ENV: &str = "PAIRS_MISMATCH_DELAY_MS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub mismatch_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            mismatch_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub mismatch_delay_ms: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            mismatch_delay_ms: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Resolve configuration: defaults, then the TOML file named by
/// `PAIRS_CONFIG`, then `PAIRS_SEED` / `PAIRS_MISMATCH_DELAY_MS`.
/// Empty environment values are ignored.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.mismatch_delay_ms {
            cfg.mismatch_delay_ms = v;
            sources.mismatch_delay_ms = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var(SEED_ENV)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid {SEED_ENV}: {seed}")))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(delay) = std::env::var(DELAY_ENV)
        && !delay.is_empty()
    {
        cfg.mismatch_delay_ms = delay
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid {DELAY_ENV}: {delay}")))?;
        sources.mismatch_delay_ms = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    mismatch_delay_ms: Option<u64>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.mismatch_delay_ms > MAX_MISMATCH_DELAY_MS {
        return Err(ConfigError::Invalid(format!(
            "mismatch_delay_ms must be at most {MAX_MISMATCH_DELAY_MS}"
        )));
    }
    Ok(())
}
