//! Asset custody behind stream escrow.
//!
//! The engine only needs two primitives from the value-transfer substrate:
//! lock funds from a payer and release locked funds to a payee. Both are
//! expressed by the [`Custody`] trait so hosts can plug in their own ledger.
//! [`InMemoryCustody`] is the default implementation used by the CLI and tests.

use crate::error::{Result, StreamError};
use crate::stream::Address;
use std::collections::HashMap;

/// Escrow capability injected into the engine.
///
/// Implementations must be all-or-nothing: an `Err` leaves balances untouched.
pub trait Custody {
    /// Moves `amount` from `owner`'s spendable balance into escrow.
    fn lock(&mut self, owner: &Address, amount: u64) -> Result<()>;

    /// Moves `amount` out of `owner`'s escrow into `to`'s spendable balance.
    fn release(&mut self, owner: &Address, amount: u64, to: &Address) -> Result<()>;
}

/// Custody balances for one address.
///
/// # Invariants
///
/// - `total == available + escrowed` after every operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyAccount {
    /// Spendable funds.
    pub available: u64,

    /// Funds locked behind this address's streams.
    pub escrowed: u64,

    /// `available + escrowed`.
    pub total: u64,
}

impl CustodyAccount {
    /// Credits spendable funds. Returns `false` on overflow.
    pub fn deposit(&mut self, amount: u64) -> bool {
        match self.total.checked_add(amount) {
            Some(total) => {
                self.available += amount;
                self.total = total;
                true
            }
            None => false,
        }
    }

    /// Moves spendable funds into escrow. Returns `false` if `available < amount`.
    pub fn hold(&mut self, amount: u64) -> bool {
        if self.available < amount {
            return false;
        }

        self.available -= amount;
        self.escrowed += amount;
        true
    }

    /// Removes escrowed funds. Returns `false` if `escrowed < amount`.
    pub fn pay_out(&mut self, amount: u64) -> bool {
        if self.escrowed < amount {
            return false;
        }

        self.escrowed -= amount;
        self.total -= amount;
        true
    }

    pub fn check_invariant(&self) -> bool {
        self.total == self.available + self.escrowed
    }
}

/// Custody kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    accounts: HashMap<Address, CustodyAccount>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `owner`'s spendable balance, as an external deposit would.
    pub fn credit(&mut self, owner: &Address, amount: u64) -> Result<()> {
        let account = self.accounts.entry(owner.clone()).or_default();
        if !account.deposit(amount) {
            return Err(StreamError::InvalidArgument(format!(
                "credit of {} overflows balance of {}",
                amount, owner
            )));
        }
        Ok(())
    }

    /// Spendable balance of `owner`, zero if unknown.
    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.accounts.get(owner).map(|a| a.available).unwrap_or(0)
    }

    /// Funds `owner` has locked in escrow, zero if unknown.
    pub fn escrowed_by(&self, owner: &Address) -> u64 {
        self.accounts.get(owner).map(|a| a.escrowed).unwrap_or(0)
    }

    /// Total escrow across all owners.
    ///
    /// Widened to `u128`: each owner may escrow up to `u64::MAX`.
    pub fn escrowed(&self) -> u128 {
        self.accounts.values().map(|a| u128::from(a.escrowed)).sum()
    }

    pub fn account(&self, owner: &Address) -> Option<&CustodyAccount> {
        self.accounts.get(owner)
    }
}

impl Custody for InMemoryCustody {
    fn lock(&mut self, owner: &Address, amount: u64) -> Result<()> {
        let available = self.balance_of(owner);
        let locked = self
            .accounts
            .get_mut(owner)
            .map(|a| a.hold(amount))
            .unwrap_or(false);
        if !locked {
            return Err(StreamError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn release(&mut self, owner: &Address, amount: u64, to: &Address) -> Result<()> {
        let escrowed = self.escrowed_by(owner);
        if escrowed < amount {
            return Err(StreamError::EscrowShortfall {
                needed: amount,
                escrowed,
            });
        }

        let recipient_total = self.accounts.get(to).map(|a| a.total).unwrap_or(0);
        if recipient_total.checked_add(amount).is_none() {
            return Err(StreamError::InvalidArgument(format!(
                "release of {} overflows balance of {}",
                amount, to
            )));
        }

        if let Some(account) = self.accounts.get_mut(owner) {
            account.pay_out(amount);
        }
        self.accounts.entry(to.clone()).or_default().deposit(amount);
        Ok(())
    }
}
