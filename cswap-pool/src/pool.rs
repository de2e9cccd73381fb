//! Pool state and the quote entry point.
//!
//! The pool is a plain state object. Every entry point takes the caller's
//! [`CallFrame`], whose `this` must be the pool address; gateways are reached
//! through a [`GatewayDirectory`] with nested frames.

use cswap_fhe::{Address, CallFrame, EncryptedInput, Handle};
use cswap_token::{GatewayDirectory, TokenGateway, TokenResult};
use tracing::debug;

use crate::{
    access::AccessList,
    error::{PoolError, PoolResult},
    quote::{QuoteBook, QuoteRecord},
    reserves::{AssetIndex, ReserveLedger, ReservePair},
};

#[derive(Clone, Debug)]
pub struct ConfidentialPool {
    address: Address,
    owner: Address,
    token0: Address,
    token1: Address,
    pub(crate) ledger: ReserveLedger,
    quotes: QuoteBook,
}

impl ConfidentialPool {
    pub fn new(address: Address, owner: Address, token0: Address, token1: Address) -> Self {
        Self {
            address,
            owner,
            token0,
            token1,
            ledger: ReserveLedger::new(),
            quotes: QuoteBook::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn index_of(&self, asset: Address) -> PoolResult<AssetIndex> {
        if asset == self.token0 {
            Ok(AssetIndex::Zero)
        } else if asset == self.token1 {
            Ok(AssetIndex::One)
        } else {
            Err(PoolError::InvalidToken(asset))
        }
    }

    pub fn token_at(&self, index: AssetIndex) -> Address {
        match index {
            AssetIndex::Zero => self.token0,
            AssetIndex::One => self.token1,
        }
    }

    pub fn reserves(&self) -> ReservePair {
        self.ledger.pair()
    }

    pub fn encrypted_reserve0(&self) -> Handle {
        self.ledger.pair().reserve0
    }

    pub fn encrypted_reserve1(&self) -> Handle {
        self.ledger.pair().reserve1
    }

    pub fn quote_of(&self, caller: Address) -> PoolResult<QuoteRecord> {
        self.quotes
            .get(caller)
            .copied()
            .ok_or(PoolError::NoQuote(caller))
    }

    pub fn encrypted_numerator(&self, caller: Address) -> PoolResult<Handle> {
        Ok(self.quote_of(caller)?.numerator)
    }

    pub fn encrypted_denominator(&self, caller: Address) -> PoolResult<Handle> {
        Ok(self.quote_of(caller)?.denominator)
    }

    /// Every handle the pool keeps in state.
    pub fn stored_handles(&self) -> Vec<Handle> {
        let mut handles = self.ledger.pair().handles().to_vec();
        handles.extend(self.quotes.handles());
        handles
    }

    /// Computes the undivided quote for swapping `amount_in` of `asset_in` and
    /// stores it under the caller's address.
    pub fn get_amount_out(
        &mut self,
        frame: &mut CallFrame<'_>,
        amount_in: &EncryptedInput,
        asset_in: Address,
    ) -> PoolResult<QuoteRecord> {
        let pair = self.ledger.require_initialized(frame)?;
        let input = self.index_of(asset_in)?;
        let amount = frame.import(&amount_in.ciphertext, &amount_in.proof)?;
        let quote = QuoteRecord::compute(frame, amount, pair.get(input), pair.get(input.other()))?;
        let caller = frame.msg_sender();
        AccessList::contract()
            .persistent(caller)
            .apply_all(frame, &quote.handles())?;
        self.quotes.record(caller, quote);
        debug!(%caller, asset = %asset_in, "quote stored");
        Ok(quote)
    }

    /// Runs `op` against the gateway of `token` in a nested frame.
    pub(crate) fn with_gateway<T>(
        frame: &mut CallFrame<'_>,
        gateways: &mut dyn GatewayDirectory,
        token: Address,
        op: impl FnOnce(&mut dyn TokenGateway, &mut CallFrame<'_>) -> TokenResult<T>,
    ) -> PoolResult<T> {
        let gateway = gateways
            .gateway_mut(token)
            .ok_or(PoolError::UnknownGateway(token))?;
        let mut nested = frame.call(token);
        Ok(op(gateway, &mut nested)?)
    }
}

#[cfg(test)]
mod tests {
    use cswap_fhe::{FheConfig, FheEvaluator, MockTfheEvaluator};
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixture {
        fhe: MockTfheEvaluator,
        pool: ConfidentialPool,
        alice: Address,
    }

    fn seeded() -> Fixture {
        let mut fhe = MockTfheEvaluator::new(FheConfig::sample()).unwrap();
        let owner = Address::derive("owner");
        let mut pool = ConfidentialPool::new(
            Address::derive("pool"),
            owner,
            Address::derive("token:cETH"),
            Address::derive("token:cUSD"),
        );
        let mut frame = CallFrame::new(&mut fhe, owner, pool.address(), 0);
        let (a0, a1) = (frame.trivial(1_000), frame.trivial(300));
        let access = AccessList::contract().persistent(owner);
        pool.ledger
            .initialize_or_add(&mut frame, a0, a1, &access)
            .unwrap();
        fhe.end_transaction();
        Fixture {
            fhe,
            pool,
            alice: Address::derive("alice"),
        }
    }

    #[test]
    fn quote_is_stored_per_caller_and_readable_by_them() {
        let mut fx = seeded();
        let bob = Address::derive("bob");
        let encryptor = fx.fhe.encryptor();
        let asset = fx.pool.token0();
        for (who, amount) in [(fx.alice, 10), (bob, 20)] {
            let input = encryptor.encrypt(amount, fx.pool.address(), who);
            let mut frame = CallFrame::new(&mut fx.fhe, who, fx.pool.address(), 1);
            fx.pool.get_amount_out(&mut frame, &input, asset).unwrap();
            fx.fhe.end_transaction();
        }

        let alice_num = fx.pool.encrypted_numerator(fx.alice).unwrap();
        let bob_den = fx.pool.encrypted_denominator(bob).unwrap();
        assert_eq!(fx.fhe.decrypt(fx.alice, alice_num).unwrap(), 10 * 997 * 300);
        assert_eq!(fx.fhe.decrypt(bob, bob_den).unwrap(), 1_000 * 1_000 + 20 * 997);
        assert!(fx.fhe.decrypt(bob, alice_num).is_err());
        assert_eq!(fx.pool.stored_handles().len(), 6);
    }

    #[test]
    fn unknown_asset_is_rejected_before_import() {
        let mut fx = seeded();
        let input = fx.fhe.encryptor().encrypt(10, fx.pool.address(), fx.alice);
        let before = fx.fhe.handle_count();
        let mut frame = CallFrame::new(&mut fx.fhe, fx.alice, fx.pool.address(), 1);
        let stranger = Address::derive("token:cBTC");
        assert_eq!(
            fx.pool.get_amount_out(&mut frame, &input, stranger),
            Err(PoolError::InvalidToken(stranger))
        );
        assert_eq!(fx.fhe.handle_count(), before);
        assert_eq!(
            fx.pool.encrypted_numerator(fx.alice),
            Err(PoolError::NoQuote(fx.alice))
        );
    }

    #[test]
    fn quote_requires_seeded_reserves() {
        let mut fhe = MockTfheEvaluator::new(FheConfig::sample()).unwrap();
        let alice = Address::derive("alice");
        let mut pool = ConfidentialPool::new(
            Address::derive("pool"),
            alice,
            Address::derive("token:a"),
            Address::derive("token:b"),
        );
        let input = fhe.encryptor().encrypt(1, pool.address(), alice);
        let mut frame = CallFrame::new(&mut fhe, alice, pool.address(), 0);
        let asset = pool.token0();
        assert_eq!(
            pool.get_amount_out(&mut frame, &input, asset),
            Err(PoolError::UninitializedReserve)
        );
    }
}
