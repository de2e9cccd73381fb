//! Encrypted arithmetic provider for the cswap confidential pool.
//!
//! Ciphertexts are opaque [`Handle`]s. Every handle carries an access-control
//! list: persistent grants survive across calls, transient grants vanish when
//! the current transaction ends. The [`MockTfheEvaluator`] keeps typed
//! plaintexts behind blake3-derived handles so the pool logic can be exercised
//! end to end without a real TFHE coprocessor.

pub mod acl;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod frame;
pub mod input;
pub mod types;

pub use acl::AccessControlList;
pub use config::FheConfig;
pub use error::{FheError, FheResult};
pub use evaluator::{CipherType, FheEvaluator, MockTfheEvaluator};
pub use frame::CallFrame;
pub use input::{EncryptedInput, ExternalEuint64, InputEncryptor, InputProof};
pub use types::{Address, Handle};
