//! Undivided constant-product quotes.
//!
//! `amount_out = amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997)`.
//! Division over ciphertexts is unavailable, so the pool stores the two sides
//! and the requester divides after decrypting them.

use std::collections::HashMap;

use cswap_fhe::{Address, CallFrame, FheResult, Handle};
use serde::{Deserialize, Serialize};

pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub numerator: Handle,
    pub denominator: Handle,
}

impl QuoteRecord {
    /// Evaluates the quote homomorphically. The result carries no grants yet.
    pub fn compute(
        frame: &mut CallFrame<'_>,
        amount_in: Handle,
        reserve_in: Handle,
        reserve_out: Handle,
    ) -> FheResult<Self> {
        let with_fee = frame.mul_scalar(amount_in, FEE_NUMERATOR)?;
        let numerator = frame.mul(with_fee, reserve_out)?;
        let scaled_reserve = frame.mul_scalar(reserve_in, FEE_DENOMINATOR)?;
        let denominator = frame.add(scaled_reserve, with_fee)?;
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn handles(&self) -> [Handle; 2] {
        [self.numerator, self.denominator]
    }
}

/// The same formula over plaintexts, with the same wrapping semantics.
pub fn plain_quote(amount_in: u64, reserve_in: u64, reserve_out: u64) -> (u64, u64) {
    let with_fee = amount_in.wrapping_mul(FEE_NUMERATOR);
    (
        with_fee.wrapping_mul(reserve_out),
        reserve_in.wrapping_mul(FEE_DENOMINATOR).wrapping_add(with_fee),
    )
}

/// Latest quote per requester.
#[derive(Clone, Debug, Default)]
pub struct QuoteBook {
    records: HashMap<Address, QuoteRecord>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, caller: Address, quote: QuoteRecord) -> Option<QuoteRecord> {
        self.records.insert(caller, quote)
    }

    pub fn get(&self, caller: Address) -> Option<&QuoteRecord> {
        self.records.get(&caller)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.records.values().flat_map(QuoteRecord::handles)
    }
}
