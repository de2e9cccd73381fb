//! Per-handle access control.
//!
//! A persistent grant lets a party decrypt or consume a handle in any later
//! call. A transient grant is scoped to the transaction that issued it and is
//! dropped by [`AccessControlList::clear_transient`]. Nothing is inherited: a
//! result handle starts with no grants at all.

use std::collections::{BTreeSet, HashMap};

use crate::types::{Address, Handle};

#[derive(Clone, Debug, Default)]
pub struct AccessControlList {
    persistent: HashMap<Handle, BTreeSet<Address>>,
    transient: HashMap<Handle, BTreeSet<Address>>,
}

impl AccessControlList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&mut self, handle: Handle, party: Address) {
        self.persistent.entry(handle).or_default().insert(party);
    }

    pub fn allow_transient(&mut self, handle: Handle, party: Address) {
        self.transient.entry(handle).or_default().insert(party);
    }

    pub fn is_allowed(&self, handle: Handle, party: Address) -> bool {
        self.is_allowed_persistent(handle, party)
            || self
                .transient
                .get(&handle)
                .is_some_and(|parties| parties.contains(&party))
    }

    pub fn is_allowed_persistent(&self, handle: Handle, party: Address) -> bool {
        self.persistent
            .get(&handle)
            .is_some_and(|parties| parties.contains(&party))
    }

    pub fn persistent_parties(&self, handle: Handle) -> BTreeSet<Address> {
        self.persistent.get(&handle).cloned().unwrap_or_default()
    }

    /// Drops every transient grant, returning how many handles carried one.
    pub fn clear_transient(&mut self) -> usize {
        let cleared = self.transient.len();
        self.transient.clear();
        cleared
    }

    pub fn transient_len(&self) -> usize {
        self.transient.len()
    }
}
