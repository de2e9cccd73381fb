//! Client-side encryption of `euint64` inputs and the proofs that bind them.
//!
//! The proof is a keyed blake3 tag over the chain id, the target contract, the
//! submitting user and the ciphertext bytes, so an input is only importable by
//! the contract and user it was produced for.

use blake3::Hasher;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    error::{FheError, FheResult},
    types::Address,
};

const MASK_CONTEXT: &str = "cswap 2024 input mask v1";
const PROOF_CONTEXT: &str = "cswap 2024 input proof v1";

/// Ciphertext of a 64-bit value as submitted by a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEuint64 {
    pub masked: [u8; 8],
    pub nonce: [u8; 16],
}

/// Well-formedness proof accompanying an [`ExternalEuint64`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputProof(pub [u8; 32]);

/// A ciphertext together with its proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    pub ciphertext: ExternalEuint64,
    pub proof: InputProof,
}

#[derive(Clone)]
pub struct InputEncryptor {
    chain_id: u64,
    mask_key: [u8; 32],
    proof_key: [u8; 32],
}

impl InputEncryptor {
    pub(crate) fn new(chain_id: u64, network_key: &[u8; 32]) -> Self {
        Self {
            chain_id,
            mask_key: blake3::derive_key(MASK_CONTEXT, network_key),
            proof_key: blake3::derive_key(PROOF_CONTEXT, network_key),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Encrypts `value` for import by `contract` on behalf of `user`.
    pub fn encrypt(&self, value: u64, contract: Address, user: Address) -> EncryptedInput {
        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);
        self.encrypt_with_nonce(value, contract, user, nonce)
    }

    pub fn encrypt_with_nonce(
        &self,
        value: u64,
        contract: Address,
        user: Address,
        nonce: [u8; 16],
    ) -> EncryptedInput {
        let pad = self.pad(&nonce);
        let mut masked = value.to_le_bytes();
        for (byte, key) in masked.iter_mut().zip(pad.iter()) {
            *byte ^= key;
        }
        let ciphertext = ExternalEuint64 { masked, nonce };
        let proof = InputProof(self.tag(&ciphertext, contract, user));
        EncryptedInput { ciphertext, proof }
    }

    /// Verifies the proof and recovers the plaintext.
    pub(crate) fn open(
        &self,
        ciphertext: &ExternalEuint64,
        proof: &InputProof,
        contract: Address,
        user: Address,
    ) -> FheResult<u64> {
        if self.tag(ciphertext, contract, user) != proof.0 {
            return Err(FheError::InvalidProof(
                "proof does not bind this ciphertext to the contract and user",
            ));
        }
        let pad = self.pad(&ciphertext.nonce);
        let mut plain = ciphertext.masked;
        for (byte, key) in plain.iter_mut().zip(pad.iter()) {
            *byte ^= key;
        }
        Ok(u64::from_le_bytes(plain))
    }

    fn pad(&self, nonce: &[u8; 16]) -> [u8; 8] {
        let digest = blake3::keyed_hash(&self.mask_key, nonce);
        let mut out = [0u8; 8];
        out.copy_from_slice(&digest.as_bytes()[..8]);
        out
    }

    fn tag(&self, ciphertext: &ExternalEuint64, contract: Address, user: Address) -> [u8; 32] {
        let mut hasher = Hasher::new_keyed(&self.proof_key);
        hasher.update(&self.chain_id.to_le_bytes());
        hasher.update(contract.as_bytes());
        hasher.update(user.as_bytes());
        hasher.update(&ciphertext.masked);
        hasher.update(&ciphertext.nonce);
        *hasher.finalize().as_bytes()
    }
}

impl std::fmt::Debug for InputEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputEncryptor")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
