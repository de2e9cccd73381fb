//! Encrypted reserve bookkeeping.
//!
//! Both reserves leave the unset state in the same write. Additions and
//! subtractions wrap modulo 2^64 like every other ciphertext operation; the
//! ledger does not guard against it.

use cswap_fhe::{Address, CallFrame, FheResult, Handle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    access::AccessList,
    error::{PoolError, PoolResult},
};

/// Which of the two pooled assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetIndex {
    Zero,
    One,
}

impl AssetIndex {
    pub fn other(self) -> Self {
        match self {
            AssetIndex::Zero => AssetIndex::One,
            AssetIndex::One => AssetIndex::Zero,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePair {
    pub reserve0: Handle,
    pub reserve1: Handle,
}

impl ReservePair {
    pub fn get(&self, index: AssetIndex) -> Handle {
        match index {
            AssetIndex::Zero => self.reserve0,
            AssetIndex::One => self.reserve1,
        }
    }

    /// Builds a pair from the reserve of `input` and the reserve of the other asset.
    pub fn from_sides(input: AssetIndex, input_reserve: Handle, output_reserve: Handle) -> Self {
        match input {
            AssetIndex::Zero => Self {
                reserve0: input_reserve,
                reserve1: output_reserve,
            },
            AssetIndex::One => Self {
                reserve0: output_reserve,
                reserve1: input_reserve,
            },
        }
    }

    pub fn handles(&self) -> [Handle; 2] {
        [self.reserve0, self.reserve1]
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReserveLedger {
    pair: ReservePair,
}

impl ReserveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(&self) -> ReservePair {
        self.pair
    }

    pub fn is_initialized(&self, frame: &CallFrame<'_>) -> bool {
        frame.is_initialized(self.pair.reserve0) && frame.is_initialized(self.pair.reserve1)
    }

    pub fn require_initialized(&self, frame: &CallFrame<'_>) -> PoolResult<ReservePair> {
        if !self.is_initialized(frame) {
            return Err(PoolError::UninitializedReserve);
        }
        Ok(self.pair)
    }

    /// Seeds the reserves on first deposit, adds to them afterwards.
    pub fn initialize_or_add(
        &mut self,
        frame: &mut CallFrame<'_>,
        amount0: Handle,
        amount1: Handle,
        access: &AccessList,
    ) -> FheResult<ReservePair> {
        let next = if self.is_initialized(frame) {
            ReservePair {
                reserve0: frame.add(self.pair.reserve0, amount0)?,
                reserve1: frame.add(self.pair.reserve1, amount1)?,
            }
        } else {
            debug!("seeding reserves");
            ReservePair {
                reserve0: amount0,
                reserve1: amount1,
            }
        };
        access.apply_all(frame, &next.handles())?;
        self.pair = next;
        Ok(next)
    }

    /// Credits the input reserve and debits the output reserve by
    /// gateway-confirmed amounts.
    pub fn apply_delta(
        &mut self,
        frame: &mut CallFrame<'_>,
        input: AssetIndex,
        confirmed_in: Handle,
        confirmed_out: Handle,
        access: &AccessList,
    ) -> PoolResult<ReservePair> {
        let current = self.require_initialized(frame)?;
        let credited = frame.add(current.get(input), confirmed_in)?;
        let debited = frame.sub(current.get(input.other()), confirmed_out)?;
        let next = ReservePair::from_sides(input, credited, debited);
        access.apply_all(frame, &next.handles())?;
        self.pair = next;
        Ok(next)
    }
}
