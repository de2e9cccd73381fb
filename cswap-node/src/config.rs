use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use cswap_fhe::FheConfig;
use cswap_pool::{PoolConfig, BPS_DENOMINATOR};
use cswap_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format:?} config: {details}")]
    Parse {
        format: ConfigFormat,
        details: String,
    },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub pool: PoolConfig,
    #[serde(default)]
    pub fhe: FheConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub scenario: ScenarioSection,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioSection {
    pub seed_reserve0: u64,
    pub seed_reserve1: u64,
    /// Amount of each asset the faucet hands every trader.
    pub trader_funding: u64,
    pub swap_amount: u64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u64,
    #[serde(default = "default_operator_ttl_secs")]
    pub operator_ttl_secs: u64,
    #[serde(default = "default_traders")]
    pub traders: Vec<String>,
}

const fn default_slippage_bps() -> u64 {
    100
}

const fn default_operator_ttl_secs() -> u64 {
    3_600
}

fn default_traders() -> Vec<String> {
    vec!["alice".into()]
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool
            .validate()
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        self.fhe
            .key_material()
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        let scenario = &self.scenario;
        if scenario.seed_reserve0 == 0 || scenario.seed_reserve1 == 0 {
            return Err(ConfigError::Validation(
                "both seed reserves must be greater than zero".into(),
            ));
        }
        if scenario.swap_amount == 0 {
            return Err(ConfigError::Validation(
                "swap amount must be greater than zero".into(),
            ));
        }
        if scenario.slippage_bps > BPS_DENOMINATOR {
            return Err(ConfigError::Validation(format!(
                "slippage of {} bps exceeds {}",
                scenario.slippage_bps, BPS_DENOMINATOR
            )));
        }
        if scenario.traders.is_empty() {
            return Err(ConfigError::Validation(
                "at least one trader must be defined".into(),
            ));
        }
        if scenario.traders.iter().any(|trader| *trader == self.pool.owner) {
            return Err(ConfigError::Validation(
                "the pool owner cannot trade in the scenario".into(),
            ));
        }
        Ok(())
    }

    pub fn sample() -> Self {
        Self {
            pool: PoolConfig::sample(),
            fhe: FheConfig::sample(),
            telemetry: TelemetryConfig::sample("cswap-node"),
            scenario: ScenarioSection {
                seed_reserve0: 1_000_000_000,
                seed_reserve1: 300_000_000,
                trader_funding: 100_000_000,
                swap_amount: 10_000_000,
                slippage_bps: default_slippage_bps(),
                operator_ttl_secs: default_operator_ttl_secs(),
                traders: default_traders(),
            },
        }
    }
}

pub fn load_config(path: &Path, format: ConfigFormat) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, resolve_format(path, format))?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| ConfigError::Parse {
            format,
            details: err.to_string(),
        }),
        ConfigFormat::Toml | ConfigFormat::Auto => {
            toml::from_str(contents).map_err(|err| ConfigError::Parse {
                format: ConfigFormat::Toml,
                details: err.to_string(),
            })
        }
    }
}

pub fn resolve_format(path: &Path, format: ConfigFormat) -> ConfigFormat {
    match format {
        ConfigFormat::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        },
        _ => format,
    }
}
