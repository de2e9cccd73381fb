use cswap_fhe::{Address, FheError};
use cswap_token::TokenError;
use thiserror::Error;

pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("reserves are not initialized")]
    UninitializedReserve,
    #[error("asset {0} is not tracked by this pool")]
    InvalidToken(Address),
    #[error("gateway {0} is not registered")]
    UnknownGateway(Address),
    #[error(transparent)]
    Fhe(#[from] FheError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("no quote recorded for {0}")]
    NoQuote(Address),
    #[error("quote denominator decrypted to zero")]
    ZeroDenominator,
    #[error("pool configuration invalid: {0}")]
    InvalidConfig(String),
}

/// Coarse failure classes of a pool call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing reserves or an unknown asset.
    Structural,
    /// A submitted ciphertext failed its proof check.
    ProofVerification,
    /// The gateway rejected an expired or missing operator approval.
    AuthorizationExpiry,
    /// A handle was consumed without a grant.
    Access,
    /// Off-chain client or configuration errors.
    Client,
}

impl PoolError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PoolError::UninitializedReserve
            | PoolError::InvalidToken(_)
            | PoolError::UnknownGateway(_) => ErrorClass::Structural,
            PoolError::Fhe(FheError::InvalidProof(_))
            | PoolError::Token(TokenError::Fhe(FheError::InvalidProof(_))) => {
                ErrorClass::ProofVerification
            }
            PoolError::Token(TokenError::OperatorExpired { .. })
            | PoolError::Token(TokenError::UnauthorizedSpender { .. }) => {
                ErrorClass::AuthorizationExpiry
            }
            PoolError::Fhe(_) | PoolError::Token(_) => ErrorClass::Access,
            PoolError::NoQuote(_) | PoolError::ZeroDenominator | PoolError::InvalidConfig(_) => {
                ErrorClass::Client
            }
        }
    }
}
