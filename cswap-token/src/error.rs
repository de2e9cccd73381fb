use cswap_fhe::{Address, FheError, Handle};
use thiserror::Error;

pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error(transparent)]
    Fhe(#[from] FheError),
    #[error("{spender} is not an operator for {holder}")]
    UnauthorizedSpender { holder: Address, spender: Address },
    #[error("operator {spender} for {holder} expired at {until}")]
    OperatorExpired {
        holder: Address,
        spender: Address,
        until: u64,
    },
    #[error("{caller} holds no grant on amount {handle}")]
    AmountNotAllowed { handle: Handle, caller: Address },
    #[error("only the token admin may mint")]
    NotAdmin,
    #[error("frame executes as {found}, token lives at {expected}")]
    FrameMismatch { expected: Address, found: Address },
}
