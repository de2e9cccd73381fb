//! Grant declarations for ciphertexts the pool produces.
//!
//! Results of homomorphic operations are usable by the pool only until the
//! current call ends and by nobody else at all. Every handle the pool writes
//! to state or hands to a gateway goes through an [`AccessList`], so the set of
//! parties that can use it is declared at the write site.

use cswap_fhe::{Address, CallFrame, FheEvaluator, FheResult, Handle};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessList {
    contract: bool,
    persistent: Vec<Address>,
    transient: Vec<Address>,
}

impl AccessList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persistent grant to the executing contract.
    pub fn contract() -> Self {
        Self {
            contract: true,
            ..Self::default()
        }
    }

    pub fn persistent(mut self, party: Address) -> Self {
        if !self.persistent.contains(&party) {
            self.persistent.push(party);
        }
        self
    }

    pub fn transient(mut self, party: Address) -> Self {
        if !self.transient.contains(&party) {
            self.transient.push(party);
        }
        self
    }

    pub fn apply(&self, frame: &mut CallFrame<'_>, handle: Handle) -> FheResult<Handle> {
        if self.contract {
            frame.grant_self(handle)?;
        }
        for party in &self.persistent {
            frame.grant_persistent(handle, *party)?;
        }
        for party in &self.transient {
            frame.grant_transient(handle, *party)?;
        }
        Ok(handle)
    }

    pub fn apply_all(&self, frame: &mut CallFrame<'_>, handles: &[Handle]) -> FheResult<()> {
        for handle in handles {
            self.apply(frame, *handle)?;
        }
        Ok(())
    }
}

/// Returns the handles `contract` could not consume in a later call.
pub fn ungranted(fhe: &dyn FheEvaluator, contract: Address, handles: &[Handle]) -> Vec<Handle> {
    handles
        .iter()
        .copied()
        .filter(|handle| fhe.is_initialized(*handle))
        .filter(|handle| !fhe.persistent_parties(*handle).contains(&contract))
        .collect()
}
