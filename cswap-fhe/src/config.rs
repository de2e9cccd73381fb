use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{FheError, FheResult};

const SAMPLE_KEY_SEED: &str = "5c1d0e7f43a2b9886d7e21f0c4b3a59e0f1d2c3b4a5968778695a4b3c2d1e0f9";

fn default_chain_id() -> u64 {
    9_000
}

fn default_key_seed() -> String {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    hex::encode(seed)
}

/// Evaluator parameters.
///
/// # TOML
/// ```text
/// [fhe]
/// chain-id = 9000
/// key-seed = "5c1d..."
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct FheConfig {
    /// Bound into every input proof so ciphertexts cannot be replayed across chains.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Hex-encoded 32-byte seed for the network input key. Generated if omitted.
    #[serde(default = "default_key_seed")]
    pub key_seed: String,
}

impl Default for FheConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            key_seed: default_key_seed(),
        }
    }
}

impl FheConfig {
    pub fn sample() -> Self {
        Self {
            chain_id: default_chain_id(),
            key_seed: SAMPLE_KEY_SEED.into(),
        }
    }

    pub fn key_material(&self) -> FheResult<[u8; 32]> {
        let bytes = hex::decode(self.key_seed.trim())
            .map_err(|err| FheError::InvalidKeySeed(err.to_string()))?;
        bytes.try_into().map_err(|raw: Vec<u8>| {
            FheError::InvalidKeySeed(format!("expected 32 bytes, got {}", raw.len()))
        })
    }
}
