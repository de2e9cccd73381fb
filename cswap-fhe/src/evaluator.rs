use std::collections::{BTreeSet, HashMap};

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    acl::AccessControlList,
    config::FheConfig,
    error::{FheError, FheResult},
    input::{ExternalEuint64, InputEncryptor, InputProof},
    types::{Address, Handle},
};

/// Encrypted type carried by a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherType {
    Bool,
    Uint64,
}

/// Homomorphic operations over 64-bit unsigned ciphertexts.
///
/// `executor` is the contract running the operation. It must hold a grant on
/// every operand; the result is usable by the executor for the rest of the
/// transaction only. Anything that must outlive the transaction, or reach
/// another party, needs an explicit grant. Arithmetic wraps modulo 2^64.
pub trait FheEvaluator {
    fn import_external(
        &mut self,
        executor: Address,
        user: Address,
        ciphertext: &ExternalEuint64,
        proof: &InputProof,
    ) -> FheResult<Handle>;
    fn trivial_encrypt(&mut self, executor: Address, value: u64) -> Handle;
    fn add(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle>;
    fn sub(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle>;
    fn mul(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle>;
    fn mul_scalar(&mut self, executor: Address, lhs: Handle, scalar: u64) -> FheResult<Handle>;
    /// Encrypted `lhs >= rhs`.
    fn ge(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle>;
    /// Oblivious `condition ? if_true : if_false`.
    fn select(
        &mut self,
        executor: Address,
        condition: Handle,
        if_true: Handle,
        if_false: Handle,
    ) -> FheResult<Handle>;
    fn is_initialized(&self, handle: Handle) -> bool;
    fn is_allowed(&self, handle: Handle, party: Address) -> bool;
    fn grant_persistent(
        &mut self,
        executor: Address,
        handle: Handle,
        party: Address,
    ) -> FheResult<()>;
    fn grant_transient(
        &mut self,
        executor: Address,
        handle: Handle,
        party: Address,
    ) -> FheResult<()>;
    fn persistent_parties(&self, handle: Handle) -> BTreeSet<Address>;
    /// Closes the current transaction, dropping every transient grant.
    fn end_transaction(&mut self);
    /// Off-chain user decryption; requires a persistent grant.
    fn decrypt(&self, requester: Address, handle: Handle) -> FheResult<u64>;
    fn decrypt_bool(&self, requester: Address, handle: Handle) -> FheResult<bool>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Plaintext {
    Bool(bool),
    Uint64(u64),
}

impl Plaintext {
    fn cipher_type(self) -> CipherType {
        match self {
            Plaintext::Bool(_) => CipherType::Bool,
            Plaintext::Uint64(_) => CipherType::Uint64,
        }
    }
}

/// Deterministic stand-in for a TFHE coprocessor.
#[derive(Clone, Debug)]
pub struct MockTfheEvaluator {
    config: FheConfig,
    encryptor: InputEncryptor,
    values: HashMap<Handle, Plaintext>,
    acl: AccessControlList,
    sequence: u64,
}

impl MockTfheEvaluator {
    pub fn new(config: FheConfig) -> FheResult<Self> {
        let key = config.key_material()?;
        Ok(Self {
            encryptor: InputEncryptor::new(config.chain_id, &key),
            config,
            values: HashMap::new(),
            acl: AccessControlList::new(),
            sequence: 0,
        })
    }

    /// Encryptor clients use to produce importable inputs.
    pub fn encryptor(&self) -> InputEncryptor {
        self.encryptor.clone()
    }

    pub fn acl(&self) -> &AccessControlList {
        &self.acl
    }

    pub fn config(&self) -> &FheConfig {
        &self.config
    }

    pub fn handle_count(&self) -> usize {
        self.values.len()
    }

    fn derive_handle(&mut self, op: &str, operands: &[&[u8]]) -> Handle {
        self.sequence += 1;
        let mut hasher = Hasher::new();
        hasher.update(b"cswap/handle");
        hasher.update(&self.config.chain_id.to_le_bytes());
        hasher.update(&self.sequence.to_le_bytes());
        hasher.update(op.as_bytes());
        for operand in operands {
            hasher.update(operand);
        }
        Handle(*hasher.finalize().as_bytes())
    }

    fn store(
        &mut self,
        executor: Address,
        op: &str,
        operands: &[&[u8]],
        value: Plaintext,
    ) -> Handle {
        let handle = self.derive_handle(op, operands);
        self.values.insert(handle, value);
        self.acl.allow_transient(handle, executor);
        trace!(%handle, op, %executor, "ciphertext produced");
        handle
    }

    fn load(&self, executor: Address, handle: Handle) -> FheResult<Plaintext> {
        let value = self
            .values
            .get(&handle)
            .copied()
            .ok_or(FheError::UnknownHandle(handle))?;
        if !self.acl.is_allowed(handle, executor) {
            return Err(FheError::AccessDenied {
                handle,
                party: executor,
            });
        }
        Ok(value)
    }

    fn load_u64(&self, executor: Address, handle: Handle) -> FheResult<u64> {
        match self.load(executor, handle)? {
            Plaintext::Uint64(value) => Ok(value),
            other => Err(FheError::TypeMismatch {
                handle,
                expected: CipherType::Uint64,
                found: other.cipher_type(),
            }),
        }
    }

    fn load_bool(&self, executor: Address, handle: Handle) -> FheResult<bool> {
        match self.load(executor, handle)? {
            Plaintext::Bool(value) => Ok(value),
            other => Err(FheError::TypeMismatch {
                handle,
                expected: CipherType::Bool,
                found: other.cipher_type(),
            }),
        }
    }

    fn binary(
        &mut self,
        executor: Address,
        op: &str,
        lhs: Handle,
        rhs: Handle,
        apply: impl FnOnce(u64, u64) -> Plaintext,
    ) -> FheResult<Handle> {
        let a = self.load_u64(executor, lhs)?;
        let b = self.load_u64(executor, rhs)?;
        let operands = [lhs.as_bytes().as_slice(), rhs.as_bytes().as_slice()];
        Ok(self.store(executor, op, &operands, apply(a, b)))
    }

    fn require_persistent(&self, requester: Address, handle: Handle) -> FheResult<Plaintext> {
        let value = self
            .values
            .get(&handle)
            .copied()
            .ok_or(FheError::UnknownHandle(handle))?;
        if !self.acl.is_allowed_persistent(handle, requester) {
            return Err(FheError::AccessDenied {
                handle,
                party: requester,
            });
        }
        Ok(value)
    }
}

impl FheEvaluator for MockTfheEvaluator {
    fn import_external(
        &mut self,
        executor: Address,
        user: Address,
        ciphertext: &ExternalEuint64,
        proof: &InputProof,
    ) -> FheResult<Handle> {
        let value = self.encryptor.open(ciphertext, proof, executor, user)?;
        Ok(self.store(
            executor,
            "import",
            &[
                ciphertext.masked.as_slice(),
                ciphertext.nonce.as_slice(),
                user.as_bytes().as_slice(),
            ],
            Plaintext::Uint64(value),
        ))
    }

    fn trivial_encrypt(&mut self, executor: Address, value: u64) -> Handle {
        self.store(executor, "trivial", &[value.to_le_bytes().as_slice()], Plaintext::Uint64(value))
    }

    fn add(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.binary(executor, "add", lhs, rhs, |a, b| Plaintext::Uint64(a.wrapping_add(b)))
    }

    fn sub(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.binary(executor, "sub", lhs, rhs, |a, b| Plaintext::Uint64(a.wrapping_sub(b)))
    }

    fn mul(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.binary(executor, "mul", lhs, rhs, |a, b| Plaintext::Uint64(a.wrapping_mul(b)))
    }

    fn mul_scalar(&mut self, executor: Address, lhs: Handle, scalar: u64) -> FheResult<Handle> {
        let a = self.load_u64(executor, lhs)?;
        Ok(self.store(
            executor,
            "mul_scalar",
            &[lhs.as_bytes().as_slice(), scalar.to_le_bytes().as_slice()],
            Plaintext::Uint64(a.wrapping_mul(scalar)),
        ))
    }

    fn ge(&mut self, executor: Address, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.binary(executor, "ge", lhs, rhs, |a, b| Plaintext::Bool(a >= b))
    }

    fn select(
        &mut self,
        executor: Address,
        condition: Handle,
        if_true: Handle,
        if_false: Handle,
    ) -> FheResult<Handle> {
        let flag = self.load_bool(executor, condition)?;
        let a = self.load_u64(executor, if_true)?;
        let b = self.load_u64(executor, if_false)?;
        // Both branches are loaded and the choice is a data-independent mux.
        let mask = (flag as u64).wrapping_neg();
        let chosen = (a & mask) | (b & !mask);
        Ok(self.store(
            executor,
            "select",
            &[
                condition.as_bytes().as_slice(),
                if_true.as_bytes().as_slice(),
                if_false.as_bytes().as_slice(),
            ],
            Plaintext::Uint64(chosen),
        ))
    }

    fn is_initialized(&self, handle: Handle) -> bool {
        !handle.is_unset()
    }

    fn is_allowed(&self, handle: Handle, party: Address) -> bool {
        self.acl.is_allowed(handle, party)
    }

    fn grant_persistent(
        &mut self,
        executor: Address,
        handle: Handle,
        party: Address,
    ) -> FheResult<()> {
        self.load(executor, handle)?;
        self.acl.allow(handle, party);
        trace!(%handle, %party, "persistent grant");
        Ok(())
    }

    fn grant_transient(
        &mut self,
        executor: Address,
        handle: Handle,
        party: Address,
    ) -> FheResult<()> {
        self.load(executor, handle)?;
        self.acl.allow_transient(handle, party);
        trace!(%handle, %party, "transient grant");
        Ok(())
    }

    fn persistent_parties(&self, handle: Handle) -> BTreeSet<Address> {
        self.acl.persistent_parties(handle)
    }

    fn end_transaction(&mut self) {
        let cleared = self.acl.clear_transient();
        trace!(cleared, "transient grants dropped");
    }

    fn decrypt(&self, requester: Address, handle: Handle) -> FheResult<u64> {
        match self.require_persistent(requester, handle)? {
            Plaintext::Uint64(value) => Ok(value),
            other => Err(FheError::TypeMismatch {
                handle,
                expected: CipherType::Uint64,
                found: other.cipher_type(),
            }),
        }
    }

    fn decrypt_bool(&self, requester: Address, handle: Handle) -> FheResult<bool> {
        match self.require_persistent(requester, handle)? {
            Plaintext::Bool(value) => Ok(value),
            other => Err(FheError::TypeMismatch {
                handle,
                expected: CipherType::Bool,
                found: other.cipher_type(),
            }),
        }
    }
}
