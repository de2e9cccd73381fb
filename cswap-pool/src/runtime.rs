//! Single-threaded chain that runs pool and token calls to completion.
//!
//! Each call executes against the live state after a snapshot is taken. An
//! error restores the snapshot, so no call leaves a partial write behind.
//! Transient grants are cleared after every call, committed or not.
//!
//! The snapshot is a full clone of the evaluator, both tokens and the pool,
//! so each call costs time proportional to the live state.

use std::time::Instant;

use cswap_fhe::{
    Address, CallFrame, EncryptedInput, FheConfig, FheEvaluator, Handle, InputEncryptor,
    MockTfheEvaluator,
};
use cswap_telemetry::{TelemetryConfig, TelemetryHandle};
use cswap_token::{ConfidentialToken, TokenGateway, TokenPair};
use tracing::{info, warn};

use crate::{
    access::ungranted,
    config::PoolConfig,
    error::{PoolError, PoolResult},
    pool::ConfidentialPool,
    reserves::ReservePair,
    settlement::{SwapReceipt, SwapRequest},
};

#[derive(Clone, Debug)]
struct ChainState {
    fhe: MockTfheEvaluator,
    tokens: TokenPair,
    pool: ConfidentialPool,
}

pub struct Chain {
    state: ChainState,
    owner: Address,
    clock: u64,
    encryptor: InputEncryptor,
    telemetry: TelemetryHandle,
}

impl Chain {
    pub fn new(
        config: &PoolConfig,
        fhe: FheConfig,
        telemetry: TelemetryConfig,
    ) -> PoolResult<Self> {
        config.validate()?;
        let fhe = MockTfheEvaluator::new(fhe)?;
        let encryptor = fhe.encryptor();
        let owner = config.owner_address();
        let tokens = TokenPair {
            token0: ConfidentialToken::new(&config.asset0.name, &config.asset0.symbol, owner),
            token1: ConfidentialToken::new(&config.asset1.name, &config.asset1.symbol, owner),
        };
        let pool = ConfidentialPool::new(
            config.pool_address(),
            owner,
            tokens.token0.address(),
            tokens.token1.address(),
        );
        info!(pool = %pool.address(), %owner, chain_id = encryptor.chain_id(), "chain ready");
        Ok(Self {
            state: ChainState { fhe, tokens, pool },
            owner,
            clock: 0,
            encryptor,
            telemetry: TelemetryHandle::from_config(telemetry),
        })
    }

    /// Chain with the sample pool, a fixed key seed and test telemetry labels.
    pub fn sample() -> PoolResult<Self> {
        Self::new(
            &PoolConfig::sample(),
            FheConfig::sample(),
            TelemetryConfig::sample("cswap-pool"),
        )
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn now(&self) -> u64 {
        self.clock
    }

    pub fn advance_time(&mut self, seconds: u64) -> u64 {
        self.clock = self.clock.saturating_add(seconds);
        self.clock
    }

    pub fn pool(&self) -> &ConfidentialPool {
        &self.state.pool
    }

    pub fn pool_address(&self) -> Address {
        self.state.pool.address()
    }

    pub fn token0(&self) -> Address {
        self.state.pool.token0()
    }

    pub fn token1(&self) -> Address {
        self.state.pool.token1()
    }

    pub fn tokens(&self) -> &TokenPair {
        &self.state.tokens
    }

    pub fn fhe(&self) -> &MockTfheEvaluator {
        &self.state.fhe
    }

    pub fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }

    /// Encrypts `value` for submission to the pool by `user`.
    pub fn encrypt_input(&self, value: u64, user: Address) -> EncryptedInput {
        self.encryptor.encrypt(value, self.pool_address(), user)
    }

    /// Off-chain decryption; requires a persistent grant.
    pub fn decrypt(&self, requester: Address, handle: Handle) -> PoolResult<u64> {
        Ok(self.state.fhe.decrypt(requester, handle)?)
    }

    pub fn balance_of(&self, token: Address, holder: Address) -> Option<Handle> {
        self.state.tokens.get(token)?.balance_of(holder)
    }

    pub fn encrypted_reserve0(&self) -> Handle {
        self.state.pool.encrypted_reserve0()
    }

    pub fn encrypted_reserve1(&self) -> Handle {
        self.state.pool.encrypted_reserve1()
    }

    pub fn encrypted_numerator(&self, caller: Address) -> PoolResult<Handle> {
        self.state.pool.encrypted_numerator(caller)
    }

    pub fn encrypted_denominator(&self, caller: Address) -> PoolResult<Handle> {
        self.state.pool.encrypted_denominator(caller)
    }

    /// Pool state handles the pool itself could not read back.
    pub fn audit_state_grants(&self) -> Vec<Handle> {
        ungranted(
            &self.state.fhe,
            self.pool_address(),
            &self.state.pool.stored_handles(),
        )
    }

    /// Admin mint of a public amount on `token`.
    pub fn faucet(&mut self, token: Address, to: Address, amount: u64) -> PoolResult<Handle> {
        let owner = self.owner;
        self.transact("token.faucet", owner, token, |frame, tokens, _| {
            let token = tokens
                .get_mut(token)
                .ok_or(PoolError::UnknownGateway(token))?;
            Ok(token.faucet_mint(frame, to, amount)?)
        })
    }

    /// Lets `operator` move `holder`'s `token` balance until `until` (inclusive).
    pub fn set_operator(
        &mut self,
        holder: Address,
        token: Address,
        operator: Address,
        until: u64,
    ) -> PoolResult<()> {
        self.transact("token.operator", holder, token, |frame, tokens, _| {
            let token = tokens
                .get_mut(token)
                .ok_or(PoolError::UnknownGateway(token))?;
            Ok(token.set_operator(frame, operator, until)?)
        })
    }

    pub fn mint(
        &mut self,
        depositor: Address,
        amount0: &EncryptedInput,
        amount1: &EncryptedInput,
    ) -> PoolResult<ReservePair> {
        let pool = self.pool_address();
        self.transact("pool.mint", depositor, pool, |frame, tokens, pool| {
            pool.mint(frame, tokens, amount0, amount1)
        })
    }

    /// Stores the caller's quote; read it back with the encrypted accessors.
    pub fn get_amount_out(
        &mut self,
        caller: Address,
        amount_in: &EncryptedInput,
        asset_in: Address,
    ) -> PoolResult<()> {
        let pool = self.pool_address();
        self.transact("pool.quote", caller, pool, |frame, _, pool| {
            pool.get_amount_out(frame, amount_in, asset_in).map(|_| ())
        })
    }

    pub fn swap(&mut self, trader: Address, request: &SwapRequest) -> PoolResult<SwapReceipt> {
        let pool = self.pool_address();
        self.transact("pool.swap", trader, pool, |frame, tokens, pool| {
            pool.swap(frame, tokens, request)
        })
    }

    fn transact<T>(
        &mut self,
        label: &'static str,
        sender: Address,
        target: Address,
        call: impl FnOnce(
            &mut CallFrame<'_>,
            &mut TokenPair,
            &mut ConfidentialPool,
        ) -> PoolResult<T>,
    ) -> PoolResult<T> {
        let started = Instant::now();
        let snapshot = self.state.clone();
        let ChainState { fhe, tokens, pool } = &mut self.state;
        let outcome = {
            let mut frame = CallFrame::new(fhe, sender, target, self.clock);
            call(&mut frame, tokens, pool)
        };
        if outcome.is_err() {
            self.state = snapshot;
        }
        self.state.fhe.end_transaction();

        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.telemetry.record_latency_ms(label, elapsed);
        let counter = match &outcome {
            Ok(_) => {
                info!(call = label, %sender, at = self.clock, "call committed");
                label
            }
            Err(err) => {
                warn!(call = label, %sender, class = ?err.class(), error = %err, "call aborted");
                "pool.abort"
            }
        };
        if let Err(err) = self.telemetry.record_counter(counter, 1) {
            warn!(%err, "telemetry counter dropped");
        }
        outcome
    }
}
