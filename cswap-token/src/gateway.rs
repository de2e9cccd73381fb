use cswap_fhe::{Address, CallFrame, Handle};

use crate::{error::TokenResult, token::ConfidentialToken};

/// Per-asset gateway the pool calls into.
///
/// Every method taking a frame expects `frame.this()` to be the gateway's own
/// address and treats `frame.msg_sender()` as the invoking party.
pub trait TokenGateway {
    fn address(&self) -> Address;
    fn symbol(&self) -> &str;
    fn balance_of(&self, holder: Address) -> Option<Handle>;
    fn set_operator(
        &mut self,
        frame: &mut CallFrame<'_>,
        operator: Address,
        until: u64,
    ) -> TokenResult<()>;
    fn is_operator(&self, holder: Address, spender: Address, now: u64) -> bool;
    /// Moves `amount` from `msg_sender` to `to`; returns the amount moved.
    fn transfer(
        &mut self,
        frame: &mut CallFrame<'_>,
        to: Address,
        amount: Handle,
    ) -> TokenResult<Handle>;
    /// Moves `amount` from `from` to `to` on behalf of an operator.
    fn transfer_from(
        &mut self,
        frame: &mut CallFrame<'_>,
        from: Address,
        to: Address,
        amount: Handle,
    ) -> TokenResult<Handle>;
}

/// Resolves gateway addresses to live gateways.
pub trait GatewayDirectory {
    fn gateway_mut(&mut self, address: Address) -> Option<&mut dyn TokenGateway>;
}

/// The two assets of a pool.
#[derive(Clone, Debug)]
pub struct TokenPair {
    pub token0: ConfidentialToken,
    pub token1: ConfidentialToken,
}

impl TokenPair {
    pub fn get(&self, address: Address) -> Option<&ConfidentialToken> {
        [&self.token0, &self.token1]
            .into_iter()
            .find(|token| token.address() == address)
    }

    pub fn get_mut(&mut self, address: Address) -> Option<&mut ConfidentialToken> {
        [&mut self.token0, &mut self.token1]
            .into_iter()
            .find(|token| token.address() == address)
    }
}

impl GatewayDirectory for TokenPair {
    fn gateway_mut(&mut self, address: Address) -> Option<&mut dyn TokenGateway> {
        if self.token0.address() == address {
            Some(&mut self.token0)
        } else if self.token1.address() == address {
            Some(&mut self.token1)
        } else {
            None
        }
    }
}
