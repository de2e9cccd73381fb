//! Confidential constant-product pool.
//!
//! Reserves, quotes and traded amounts are encrypted handles. The pool never
//! divides and never branches on a secret: quotes are returned as an undivided
//! numerator/denominator pair for the trader to divide off-chain, and slippage
//! protection collapses a failed swap into a zero-amount transfer instead of a
//! revert.

pub mod access;
pub mod client;
pub mod config;
pub mod error;
pub mod mint;
pub mod pool;
pub mod quote;
pub mod reserves;
pub mod runtime;
pub mod settlement;

pub use access::{ungranted, AccessList};
pub use client::{divide_quote, min_out_for, Fill, Trader, BPS_DENOMINATOR};
pub use config::{AssetConfig, PoolConfig};
pub use error::{ErrorClass, PoolError, PoolResult};
pub use pool::ConfidentialPool;
pub use quote::{plain_quote, QuoteBook, QuoteRecord, FEE_DENOMINATOR, FEE_NUMERATOR};
pub use reserves::{AssetIndex, ReserveLedger, ReservePair};
pub use runtime::Chain;
pub use settlement::{SwapReceipt, SwapRequest};
