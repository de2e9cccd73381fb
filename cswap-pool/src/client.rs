//! Off-chain half of a trade.
//!
//! The pool only ever stores an undivided quote. A trader decrypts both sides,
//! floor-divides locally, derives a slippage floor and submits everything back
//! encrypted.

use cswap_fhe::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{PoolError, PoolResult},
    runtime::Chain,
    settlement::{SwapReceipt, SwapRequest},
};

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Floor division of a decrypted quote.
pub fn divide_quote(numerator: u64, denominator: u64) -> PoolResult<u64> {
    if denominator == 0 {
        return Err(PoolError::ZeroDenominator);
    }
    Ok(numerator / denominator)
}

/// Lowest acceptable output for a tolerance in basis points. Tolerances above
/// 100% are treated as 100%.
pub fn min_out_for(expected: u64, slippage_bps: u64) -> u64 {
    let kept = BPS_DENOMINATOR.saturating_sub(slippage_bps);
    let floor = u128::from(expected) * u128::from(kept) / u128::from(BPS_DENOMINATOR);
    // kept <= BPS_DENOMINATOR, so the floor never exceeds `expected`.
    floor as u64
}

/// Result of a quoted swap as seen by the trader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub expected_out: u64,
    pub min_out: u64,
    pub receipt: SwapReceipt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trader {
    label: String,
    address: Address,
}

impl Trader {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let address = Address::derive(&label);
        Self { label, address }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Authorizes the pool to pull `token` until `ttl` seconds from now.
    pub fn approve_pool(&self, chain: &mut Chain, token: Address, ttl: u64) -> PoolResult<()> {
        let pool = chain.pool_address();
        let until = chain.now().saturating_add(ttl);
        chain.set_operator(self.address, token, pool, until)
    }

    /// Requests a quote and divides it. Returns the expected output amount.
    pub fn quote(&self, chain: &mut Chain, amount_in: u64, asset_in: Address) -> PoolResult<u64> {
        let input = chain.encrypt_input(amount_in, self.address);
        chain.get_amount_out(self.address, &input, asset_in)?;
        let numerator = chain.decrypt(self.address, chain.encrypted_numerator(self.address)?)?;
        let denominator = chain.decrypt(self.address, chain.encrypted_denominator(self.address)?)?;
        let expected = divide_quote(numerator, denominator)?;
        debug!(trader = %self.label, amount_in, expected, "quote divided");
        Ok(expected)
    }

    /// Submits a swap with an explicit expected output and floor.
    pub fn swap_with_floor(
        &self,
        chain: &mut Chain,
        amount_in: u64,
        asset_in: Address,
        expected_out: u64,
        min_out: u64,
    ) -> PoolResult<SwapReceipt> {
        let request = SwapRequest {
            amount_in: chain.encrypt_input(amount_in, self.address),
            expected_amount_out: chain.encrypt_input(expected_out, self.address),
            min_amount_out: chain.encrypt_input(min_out, self.address),
            asset_in,
            recipient: self.address,
        };
        chain.swap(self.address, &request)
    }

    /// Quotes, derives the floor from `slippage_bps` and swaps to self.
    pub fn swap_exact_in(
        &self,
        chain: &mut Chain,
        amount_in: u64,
        asset_in: Address,
        slippage_bps: u64,
    ) -> PoolResult<Fill> {
        let expected_out = self.quote(chain, amount_in, asset_in)?;
        let min_out = min_out_for(expected_out, slippage_bps);
        let receipt = self.swap_with_floor(chain, amount_in, asset_in, expected_out, min_out)?;
        Ok(Fill {
            expected_out,
            min_out,
            receipt,
        })
    }

    /// Decrypted balance; zero when the token never credited this trader.
    pub fn balance(&self, chain: &Chain, token: Address) -> PoolResult<u64> {
        match chain.balance_of(token, self.address) {
            Some(handle) => chain.decrypt(self.address, handle),
            None => Ok(0),
        }
    }
}
