//! Slippage-protected settlement.
//!
//! The slippage check is an encrypted comparison. Its outcome only ever feeds
//! `select`, so a swap below the trader's floor still runs every step and
//! settles with two zero-amount transfers. The output leg is also gated on
//! the input gateway having moved the full input, which it either does or
//! clamps to zero.

use cswap_fhe::{Address, CallFrame, EncryptedInput, Handle};
use cswap_token::GatewayDirectory;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    access::AccessList,
    error::PoolResult,
    pool::ConfidentialPool,
    reserves::ReservePair,
};

/// Inputs of one swap call. All three amounts are encrypted for the pool and
/// the submitting trader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub amount_in: EncryptedInput,
    pub expected_amount_out: EncryptedInput,
    pub min_amount_out: EncryptedInput,
    pub asset_in: Address,
    pub recipient: Address,
}

/// Handles produced by a settled swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub asset_in: Address,
    /// Amount the input gateway actually pulled from the trader.
    pub amount_in: Handle,
    /// Amount the output gateway actually sent to the recipient.
    pub amount_out: Handle,
    pub reserves: ReservePair,
}

impl ConfidentialPool {
    pub fn swap(
        &mut self,
        frame: &mut CallFrame<'_>,
        gateways: &mut dyn GatewayDirectory,
        request: &SwapRequest,
    ) -> PoolResult<SwapReceipt> {
        self.ledger.require_initialized(frame)?;
        let input = self.index_of(request.asset_in)?;
        let token_in = self.token_at(input);
        let token_out = self.token_at(input.other());

        let amount_in = frame.import(
            &request.amount_in.ciphertext,
            &request.amount_in.proof,
        )?;
        let expected = frame.import(
            &request.expected_amount_out.ciphertext,
            &request.expected_amount_out.proof,
        )?;
        let floor = frame.import(
            &request.min_amount_out.ciphertext,
            &request.min_amount_out.proof,
        )?;
        AccessList::new()
            .transient(token_in)
            .transient(token_out)
            .apply(frame, amount_in)?;

        let sufficient = frame.ge(expected, floor)?;
        let zero = frame.trivial(0);
        let transfer_amount = frame.select(sufficient, expected, zero)?;
        let input_amount = frame.select(sufficient, amount_in, zero)?;
        AccessList::new().transient(token_in).apply(frame, input_amount)?;

        let trader = frame.msg_sender();
        let pool = frame.this();
        let recipient = request.recipient;
        let confirmed_in = Self::with_gateway(frame, gateways, token_in, |gateway, nested| {
            gateway.transfer_from(nested, trader, pool, input_amount)
        })?;

        let paid = frame.ge(confirmed_in, input_amount)?;
        let output_amount = frame.select(paid, transfer_amount, zero)?;
        AccessList::new().transient(token_out).apply(frame, output_amount)?;
        let confirmed_out = Self::with_gateway(frame, gateways, token_out, |gateway, nested| {
            gateway.transfer(nested, recipient, output_amount)
        })?;

        let access = AccessList::contract()
            .persistent(recipient)
            .persistent(self.owner());
        let reserves = self
            .ledger
            .apply_delta(frame, input, confirmed_in, confirmed_out, &access)?;
        debug!(%trader, %recipient, asset_in = %request.asset_in, "swap settled");
        Ok(SwapReceipt {
            asset_in: request.asset_in,
            amount_in: confirmed_in,
            amount_out: confirmed_out,
            reserves,
        })
    }
}
