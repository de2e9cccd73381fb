//! One-sided liquidity deposits.
//!
//! A deposit pulls both assets from the caller and adds whatever the gateways
//! confirm to the reserves. No liquidity shares are issued.

use cswap_fhe::{CallFrame, EncryptedInput};
use cswap_token::GatewayDirectory;
use tracing::debug;

use crate::{
    access::AccessList,
    error::PoolResult,
    pool::ConfidentialPool,
    reserves::ReservePair,
};

impl ConfidentialPool {
    pub fn mint(
        &mut self,
        frame: &mut CallFrame<'_>,
        gateways: &mut dyn GatewayDirectory,
        amount0: &EncryptedInput,
        amount1: &EncryptedInput,
    ) -> PoolResult<ReservePair> {
        let token0 = self.token0();
        let token1 = self.token1();
        let deposit0 = frame.import(&amount0.ciphertext, &amount0.proof)?;
        let deposit1 = frame.import(&amount1.ciphertext, &amount1.proof)?;
        AccessList::contract().transient(token0).apply(frame, deposit0)?;
        AccessList::contract().transient(token1).apply(frame, deposit1)?;

        let depositor = frame.msg_sender();
        let pool = frame.this();
        let confirmed0 = Self::with_gateway(frame, gateways, token0, |gateway, nested| {
            gateway.transfer_from(nested, depositor, pool, deposit0)
        })?;
        let confirmed1 = Self::with_gateway(frame, gateways, token1, |gateway, nested| {
            gateway.transfer_from(nested, depositor, pool, deposit1)
        })?;

        let access = AccessList::contract()
            .persistent(depositor)
            .persistent(self.owner());
        let reserves = self
            .ledger
            .initialize_or_add(frame, confirmed0, confirmed1, &access)?;
        debug!(%depositor, "liquidity added");
        Ok(reserves)
    }
}
