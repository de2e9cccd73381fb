//! Execution frame for one contract invocation.
//!
//! A frame pairs the evaluator with `msg_sender`/`this`, so contract code
//! issues homomorphic operations as itself. Calling into another contract opens
//! a nested frame where the caller becomes `msg_sender`.

use std::collections::BTreeSet;

use crate::{
    error::FheResult,
    evaluator::FheEvaluator,
    input::{ExternalEuint64, InputProof},
    types::{Address, Handle},
};

pub struct CallFrame<'a> {
    fhe: &'a mut dyn FheEvaluator,
    msg_sender: Address,
    this: Address,
    timestamp: u64,
}

impl<'a> CallFrame<'a> {
    pub fn new(
        fhe: &'a mut dyn FheEvaluator,
        msg_sender: Address,
        this: Address,
        timestamp: u64,
    ) -> Self {
        Self {
            fhe,
            msg_sender,
            this,
            timestamp,
        }
    }

    pub fn msg_sender(&self) -> Address {
        self.msg_sender
    }

    pub fn this(&self) -> Address {
        self.this
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Opens a nested frame for a call from `this` into `target`.
    pub fn call(&mut self, target: Address) -> CallFrame<'_> {
        CallFrame {
            fhe: &mut *self.fhe,
            msg_sender: self.this,
            this: target,
            timestamp: self.timestamp,
        }
    }

    /// Imports a ciphertext submitted by `msg_sender`.
    pub fn import(
        &mut self,
        ciphertext: &ExternalEuint64,
        proof: &InputProof,
    ) -> FheResult<Handle> {
        self.fhe
            .import_external(self.this, self.msg_sender, ciphertext, proof)
    }

    pub fn trivial(&mut self, value: u64) -> Handle {
        self.fhe.trivial_encrypt(self.this, value)
    }

    pub fn add(&mut self, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.fhe.add(self.this, lhs, rhs)
    }

    pub fn sub(&mut self, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.fhe.sub(self.this, lhs, rhs)
    }

    pub fn mul(&mut self, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.fhe.mul(self.this, lhs, rhs)
    }

    pub fn mul_scalar(&mut self, lhs: Handle, scalar: u64) -> FheResult<Handle> {
        self.fhe.mul_scalar(self.this, lhs, scalar)
    }

    pub fn ge(&mut self, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        self.fhe.ge(self.this, lhs, rhs)
    }

    pub fn select(
        &mut self,
        condition: Handle,
        if_true: Handle,
        if_false: Handle,
    ) -> FheResult<Handle> {
        self.fhe.select(self.this, condition, if_true, if_false)
    }

    /// Persistent grant to the executing contract itself.
    pub fn grant_self(&mut self, handle: Handle) -> FheResult<()> {
        self.fhe.grant_persistent(self.this, handle, self.this)
    }

    pub fn grant_transient(&mut self, handle: Handle, party: Address) -> FheResult<()> {
        self.fhe.grant_transient(self.this, handle, party)
    }

    pub fn grant_persistent(&mut self, handle: Handle, party: Address) -> FheResult<()> {
        self.fhe.grant_persistent(self.this, handle, party)
    }

    pub fn is_allowed(&self, handle: Handle, party: Address) -> bool {
        self.fhe.is_allowed(handle, party)
    }

    pub fn is_initialized(&self, handle: Handle) -> bool {
        self.fhe.is_initialized(handle)
    }

    pub fn persistent_parties(&self, handle: Handle) -> BTreeSet<Address> {
        self.fhe.persistent_parties(handle)
    }
}
