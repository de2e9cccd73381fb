//! Seed, quote and swap rounds against a simulated pool.
//!
//! # Example
//! ```
//! use cswap_node::config::Config;
//! use cswap_node::scenario::ScenarioRunner;
//!
//! let config = Config::sample();
//! let mut runner = ScenarioRunner::new(&config).unwrap();
//! let report = runner.run_round(false).unwrap();
//! assert!(report.trades.iter().all(|trade| trade.filled));
//! ```

use cswap_fhe::Address;
use cswap_pool::{min_out_for, Chain, PoolError, Trader};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ScenarioSection};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("seeding left reserves at {reserve0}/{reserve1}")]
    Seed { reserve0: u64, reserve1: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TradeReport {
    pub trader: String,
    pub asset_in: String,
    pub amount_in: u64,
    pub expected_out: u64,
    pub min_out: u64,
    pub paid: u64,
    pub received: u64,
    pub filled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub timestamp: u64,
    pub trades: Vec<TradeReport>,
    pub reserve0: u64,
    pub reserve1: u64,
}

pub struct ScenarioRunner {
    chain: Chain,
    settings: ScenarioSection,
    traders: Vec<Trader>,
    symbols: [String; 2],
    round: u32,
}

impl ScenarioRunner {
    /// Builds the chain, funds every account and seeds the pool.
    pub fn new(config: &Config) -> Result<Self, ScenarioError> {
        let mut chain = Chain::new(&config.pool, config.fhe.clone(), config.telemetry.clone())?;
        let settings = config.scenario.clone();
        let (token0, token1) = (chain.token0(), chain.token1());

        let lp = Trader::new(format!("{}-lp", config.pool.owner));
        chain.faucet(token0, lp.address(), settings.seed_reserve0)?;
        chain.faucet(token1, lp.address(), settings.seed_reserve1)?;
        lp.approve_pool(&mut chain, token0, settings.operator_ttl_secs)?;
        lp.approve_pool(&mut chain, token1, settings.operator_ttl_secs)?;
        let amount0 = chain.encrypt_input(settings.seed_reserve0, lp.address());
        let amount1 = chain.encrypt_input(settings.seed_reserve1, lp.address());
        let seeded = chain.mint(lp.address(), &amount0, &amount1)?;
        let reserve0 = chain.decrypt(lp.address(), seeded.reserve0)?;
        let reserve1 = chain.decrypt(lp.address(), seeded.reserve1)?;
        if (reserve0, reserve1) != (settings.seed_reserve0, settings.seed_reserve1) {
            return Err(ScenarioError::Seed { reserve0, reserve1 });
        }
        info!(reserve0, reserve1, "pool seeded");

        let traders: Vec<Trader> = settings.traders.iter().map(Trader::new).collect();
        for trader in &traders {
            chain.faucet(token0, trader.address(), settings.trader_funding)?;
            chain.faucet(token1, trader.address(), settings.trader_funding)?;
        }

        Ok(Self {
            chain,
            settings,
            traders,
            symbols: [
                config.pool.asset0.symbol.clone(),
                config.pool.asset1.symbol.clone(),
            ],
            round: 0,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// One swap per trader. Even rounds sell asset0, odd rounds sell asset1.
    /// With `strict_slippage` every floor sits one unit above the quote, so the
    /// swaps settle with zero effect.
    pub fn run_round(&mut self, strict_slippage: bool) -> Result<RoundReport, ScenarioError> {
        let round = self.round;
        self.round += 1;
        let side = (round % 2) as usize;
        let asset_in = if side == 0 {
            self.chain.token0()
        } else {
            self.chain.token1()
        };

        let mut trades = Vec::with_capacity(self.traders.len());
        for trader in &self.traders {
            trader.approve_pool(&mut self.chain, asset_in, self.settings.operator_ttl_secs)?;
            let amount_in = self.settings.swap_amount;
            let expected_out = trader.quote(&mut self.chain, amount_in, asset_in)?;
            let min_out = if strict_slippage {
                expected_out.saturating_add(1)
            } else {
                min_out_for(expected_out, self.settings.slippage_bps)
            };
            let receipt = trader.swap_with_floor(
                &mut self.chain,
                amount_in,
                asset_in,
                expected_out,
                min_out,
            )?;
            let paid = self.chain.decrypt(trader.address(), receipt.amount_in)?;
            let received = self.chain.decrypt(trader.address(), receipt.amount_out)?;
            debug!(trader = trader.label(), round, paid, received, "trade settled");
            trades.push(TradeReport {
                trader: trader.label().to_owned(),
                asset_in: self.symbols[side].clone(),
                amount_in,
                expected_out,
                min_out,
                paid,
                received,
                filled: paid > 0,
            });
        }

        let owner = self.chain.owner();
        let report = RoundReport {
            round,
            timestamp: self.chain.now(),
            trades,
            reserve0: self.reserve(owner, 0)?,
            reserve1: self.reserve(owner, 1)?,
        };
        info!(round, reserve0 = report.reserve0, reserve1 = report.reserve1, "round complete");
        self.chain.advance_time(1);
        Ok(report)
    }

    fn reserve(&self, reader: Address, index: usize) -> Result<u64, ScenarioError> {
        let handle = if index == 0 {
            self.chain.encrypted_reserve0()
        } else {
            self.chain.encrypted_reserve1()
        };
        Ok(self.chain.decrypt(reader, handle)?)
    }
}
