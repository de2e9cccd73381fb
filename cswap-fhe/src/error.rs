use thiserror::Error;

use crate::{evaluator::CipherType, types::{Address, Handle}};

pub type FheResult<T> = Result<T, FheError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FheError {
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(Handle),
    #[error("{party} holds no grant on {handle}")]
    AccessDenied { handle: Handle, party: Address },
    #[error("{handle} encrypts {found:?}, expected {expected:?}")]
    TypeMismatch {
        handle: Handle,
        expected: CipherType,
        found: CipherType,
    },
    #[error("input proof rejected: {0}")]
    InvalidProof(&'static str),
    #[error("invalid key seed: {0}")]
    InvalidKeySeed(String),
}
