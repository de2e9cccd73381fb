use cswap_fhe::Address;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// One pooled asset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AssetConfig {
    pub name: String,
    pub symbol: String,
}

impl AssetConfig {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Pool deployment parameters.
///
/// # TOML
/// ```text
/// [pool]
/// owner = "owner"
/// asset0 = { name = "Confidential Ether", symbol = "cETH" }
/// asset1 = { name = "Confidential Dollar", symbol = "cUSD" }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PoolConfig {
    /// Label the owner address is derived from. The owner administers both
    /// tokens and keeps read access to the reserves.
    pub owner: String,
    pub asset0: AssetConfig,
    pub asset1: AssetConfig,
}

impl PoolConfig {
    pub fn sample() -> Self {
        Self {
            owner: "owner".into(),
            asset0: AssetConfig::new("Confidential Ether", "cETH"),
            asset1: AssetConfig::new("Confidential Dollar", "cUSD"),
        }
    }

    pub fn validate(&self) -> PoolResult<()> {
        if self.owner.trim().is_empty() {
            return Err(PoolError::InvalidConfig("owner label must not be empty".into()));
        }
        for asset in [&self.asset0, &self.asset1] {
            if asset.symbol.trim().is_empty() {
                return Err(PoolError::InvalidConfig(format!(
                    "asset `{}` needs a symbol",
                    asset.name
                )));
            }
        }
        if self.asset0.symbol == self.asset1.symbol {
            return Err(PoolError::InvalidConfig(format!(
                "both assets use symbol `{}`",
                self.asset0.symbol
            )));
        }
        Ok(())
    }

    pub fn owner_address(&self) -> Address {
        Address::derive(&self.owner)
    }

    pub fn pool_address(&self) -> Address {
        Address::derive(&format!("pool:{}/{}", self.asset0.symbol, self.asset1.symbol))
    }
}
