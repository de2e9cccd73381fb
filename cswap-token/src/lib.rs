//! Confidential token gateway used by the cswap pool.
//!
//! Balances are encrypted handles. Transfers never fail on insufficient funds:
//! the moved amount is obliviously clamped to zero instead, and every transfer
//! returns the handle of the amount it actually moved.

pub mod error;
pub mod gateway;
pub mod token;

pub use error::{TokenError, TokenResult};
pub use gateway::{GatewayDirectory, TokenGateway, TokenPair};
pub use token::ConfidentialToken;
