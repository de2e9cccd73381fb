use std::collections::HashMap;

use cswap_fhe::{Address, CallFrame, Handle};
use tracing::debug;

use crate::{
    error::{TokenError, TokenResult},
    gateway::TokenGateway,
};

/// Token with encrypted balances and time-bounded operator approvals.
#[derive(Clone, Debug)]
pub struct ConfidentialToken {
    address: Address,
    name: String,
    symbol: String,
    admin: Address,
    balances: HashMap<Address, Handle>,
    /// (holder, operator) -> approval expiry, inclusive.
    operators: HashMap<(Address, Address), u64>,
}

impl ConfidentialToken {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, admin: Address) -> Self {
        let symbol = symbol.into();
        Self {
            address: Address::derive(&format!("token:{symbol}")),
            name: name.into(),
            symbol,
            admin,
            balances: HashMap::new(),
            operators: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Admin-only mint of a public amount, used to fund accounts.
    pub fn faucet_mint(
        &mut self,
        frame: &mut CallFrame<'_>,
        to: Address,
        amount: u64,
    ) -> TokenResult<Handle> {
        self.check_frame(frame)?;
        if frame.msg_sender() != self.admin {
            return Err(TokenError::NotAdmin);
        }
        let minted = frame.trivial(amount);
        let current = self.balance_or_zero(frame, to);
        let updated = frame.add(current, minted)?;
        self.store_balance(frame, to, updated)?;
        debug!(token = %self.symbol, %to, "minted");
        Ok(updated)
    }

    fn check_frame(&self, frame: &CallFrame<'_>) -> TokenResult<()> {
        if frame.this() != self.address {
            return Err(TokenError::FrameMismatch {
                expected: self.address,
                found: frame.this(),
            });
        }
        Ok(())
    }

    fn balance_or_zero(&self, frame: &mut CallFrame<'_>, holder: Address) -> Handle {
        match self.balances.get(&holder) {
            Some(handle) => *handle,
            None => frame.trivial(0),
        }
    }

    fn store_balance(
        &mut self,
        frame: &mut CallFrame<'_>,
        holder: Address,
        balance: Handle,
    ) -> TokenResult<()> {
        frame.grant_self(balance)?;
        frame.grant_persistent(balance, holder)?;
        self.balances.insert(holder, balance);
        Ok(())
    }

    fn update(
        &mut self,
        frame: &mut CallFrame<'_>,
        from: Address,
        to: Address,
        amount: Handle,
    ) -> TokenResult<Handle> {
        let zero = frame.trivial(0);
        let from_balance = self.balance_or_zero(frame, from);
        let covered = frame.ge(from_balance, amount)?;
        let moved = frame.select(covered, amount, zero)?;
        let debited = frame.sub(from_balance, moved)?;
        self.store_balance(frame, from, debited)?;

        let to_balance = self.balance_or_zero(frame, to);
        let credited = frame.add(to_balance, moved)?;
        self.store_balance(frame, to, credited)?;

        frame.grant_self(moved)?;
        frame.grant_persistent(moved, from)?;
        frame.grant_persistent(moved, to)?;
        frame.grant_transient(moved, frame.msg_sender())?;
        debug!(token = %self.symbol, %from, %to, "confidential transfer");
        Ok(moved)
    }

    fn check_amount(&self, frame: &CallFrame<'_>, amount: Handle) -> TokenResult<()> {
        let caller = frame.msg_sender();
        if !frame.is_allowed(amount, caller) {
            return Err(TokenError::AmountNotAllowed {
                handle: amount,
                caller,
            });
        }
        Ok(())
    }
}

impl TokenGateway for ConfidentialToken {
    fn address(&self) -> Address {
        self.address
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, holder: Address) -> Option<Handle> {
        self.balances.get(&holder).copied()
    }

    fn set_operator(
        &mut self,
        frame: &mut CallFrame<'_>,
        operator: Address,
        until: u64,
    ) -> TokenResult<()> {
        self.check_frame(frame)?;
        self.operators.insert((frame.msg_sender(), operator), until);
        let holder = frame.msg_sender();
        debug!(token = %self.symbol, %holder, %operator, until, "operator set");
        Ok(())
    }

    fn is_operator(&self, holder: Address, spender: Address, now: u64) -> bool {
        holder == spender
            || self
                .operators
                .get(&(holder, spender))
                .is_some_and(|until| now <= *until)
    }

    fn transfer(
        &mut self,
        frame: &mut CallFrame<'_>,
        to: Address,
        amount: Handle,
    ) -> TokenResult<Handle> {
        self.check_frame(frame)?;
        self.check_amount(frame, amount)?;
        let from = frame.msg_sender();
        self.update(frame, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        frame: &mut CallFrame<'_>,
        from: Address,
        to: Address,
        amount: Handle,
    ) -> TokenResult<Handle> {
        self.check_frame(frame)?;
        let spender = frame.msg_sender();
        if !self.is_operator(from, spender, frame.timestamp()) {
            return Err(match self.operators.get(&(from, spender)) {
                Some(until) => TokenError::OperatorExpired {
                    holder: from,
                    spender,
                    until: *until,
                },
                None => TokenError::UnauthorizedSpender {
                    holder: from,
                    spender,
                },
            });
        }
        self.check_amount(frame, amount)?;
        self.update(frame, from, to, amount)
    }
}
