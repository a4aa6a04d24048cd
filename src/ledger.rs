//! Per-party aggregate ledgers.
//!
//! Ledgers hold totals and stream identifiers only. Stream data itself lives
//! in the [`StreamStore`](crate::store::StreamStore).

use crate::error::{Result, StreamError};
use crate::stream::{Address, StreamId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Aggregate record for a payer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayerLedger {
    /// Sum of `total_amount` over every stream this payer created.
    pub total_deposited: u64,

    /// Sum of amounts released from this payer's escrow to payees.
    pub total_released: u64,

    stream_ids: BTreeSet<StreamId>,
}

impl PayerLedger {
    /// Returns `true` if `amount` more can be deposited without overflow.
    pub fn can_deposit(&self, amount: u64) -> bool {
        self.total_deposited.checked_add(amount).is_some()
    }

    /// Records a newly created stream.
    ///
    /// Returns `false` and changes nothing if `total_deposited` would overflow.
    pub fn record_stream(&mut self, id: StreamId, amount: u64) -> bool {
        match self.total_deposited.checked_add(amount) {
            Some(total) => {
                self.stream_ids.insert(id);
                self.total_deposited = total;
                true
            }
            None => false,
        }
    }

    pub fn can_release(&self, amount: u64) -> bool {
        self.total_released.checked_add(amount).is_some()
    }

    /// Returns `false` and changes nothing if `total_released` would overflow.
    pub fn record_release(&mut self, amount: u64) -> bool {
        match self.total_released.checked_add(amount) {
            Some(total) => {
                self.total_released = total;
                true
            }
            None => false,
        }
    }

    pub fn stream_ids(&self) -> Vec<StreamId> {
        self.stream_ids.iter().copied().collect()
    }

    pub fn stats(&self) -> PayerStats {
        PayerStats {
            total_deposited: self.total_deposited,
            total_released: self.total_released,
        }
    }
}

/// Aggregate record for a payee.
///
/// `total_earned` and `total_withdrawn` always hold the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayeeLedger {
    pub total_earned: u64,
    pub total_withdrawn: u64,
    stream_ids: BTreeSet<StreamId>,
}

impl PayeeLedger {
    pub fn record_stream(&mut self, id: StreamId) {
        self.stream_ids.insert(id);
    }

    pub fn can_earn(&self, amount: u64) -> bool {
        self.total_earned.checked_add(amount).is_some()
    }

    /// Returns `false` and changes nothing if the totals would overflow.
    pub fn record_withdrawal(&mut self, id: StreamId, amount: u64) -> bool {
        match self.total_earned.checked_add(amount) {
            Some(total) => {
                self.stream_ids.insert(id);
                self.total_earned = total;
                self.total_withdrawn = total;
                true
            }
            None => false,
        }
    }

    pub fn stream_ids(&self) -> Vec<StreamId> {
        self.stream_ids.iter().copied().collect()
    }

    pub fn stats(&self) -> PayeeStats {
        PayeeStats {
            total_earned: self.total_earned,
            total_withdrawn: self.total_withdrawn,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PayerStats {
    pub total_deposited: u64,
    pub total_released: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PayeeStats {
    pub total_earned: u64,
    pub total_withdrawn: u64,
}

/// Both roles' view of one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountOverview {
    pub payer_streams: Vec<StreamId>,
    pub payee_streams: Vec<StreamId>,
    pub payer_stats: PayerStats,
    pub payee_stats: PayeeStats,
}

impl AccountOverview {
    pub fn total_streams(&self) -> usize {
        self.payer_streams.len() + self.payee_streams.len()
    }
}

/// Registry of every payer and payee ledger.
///
/// Reads for unknown addresses return zeroed defaults.
#[derive(Debug, Default)]
pub struct Ledgers {
    payers: HashMap<Address, PayerLedger>,
    payees: HashMap<Address, PayeeLedger>,
}

impl Ledgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the payer ledger. Returns `false` if it already existed.
    pub fn init_payer(&mut self, owner: &Address) -> bool {
        if self.payers.contains_key(owner) {
            return false;
        }
        self.payers.insert(owner.clone(), PayerLedger::default());
        true
    }

    /// Creates the payee ledger. Returns `false` if it already existed.
    pub fn init_payee(&mut self, owner: &Address) -> bool {
        if self.payees.contains_key(owner) {
            return false;
        }
        self.payees.insert(owner.clone(), PayeeLedger::default());
        true
    }

    pub fn payer(&self, owner: &Address) -> Option<&PayerLedger> {
        self.payers.get(owner)
    }

    pub fn payee(&self, owner: &Address) -> Option<&PayeeLedger> {
        self.payees.get(owner)
    }

    pub fn payer_mut(&mut self, owner: &Address) -> Option<&mut PayerLedger> {
        self.payers.get_mut(owner)
    }

    /// Returns the payee ledger, creating a zeroed one if needed.
    pub fn payee_entry(&mut self, owner: &Address) -> &mut PayeeLedger {
        self.payees.entry(owner.clone()).or_default()
    }

    /// Checks that a release of `amount` from `payer` to `payee` fits both
    /// ledgers' totals. Missing ledgers start from zero and always fit.
    pub fn check_payout(&self, payer: &Address, payee: &Address, amount: u64) -> Result<()> {
        if !self.payer(payer).map_or(true, |l| l.can_release(amount)) {
            return Err(StreamError::InvalidArgument(format!(
                "release of {} overflows total released by {}",
                amount, payer
            )));
        }
        if !self.payee(payee).map_or(true, |l| l.can_earn(amount)) {
            return Err(StreamError::InvalidArgument(format!(
                "withdrawal of {} overflows total earned by {}",
                amount, payee
            )));
        }
        Ok(())
    }

    pub fn payer_stats(&self, owner: &Address) -> PayerStats {
        self.payer(owner).map(PayerLedger::stats).unwrap_or_default()
    }

    pub fn payee_stats(&self, owner: &Address) -> PayeeStats {
        self.payee(owner).map(PayeeLedger::stats).unwrap_or_default()
    }

    pub fn payer_streams(&self, owner: &Address) -> Vec<StreamId> {
        self.payer(owner)
            .map(PayerLedger::stream_ids)
            .unwrap_or_default()
    }

    pub fn payee_streams(&self, owner: &Address) -> Vec<StreamId> {
        self.payee(owner)
            .map(PayeeLedger::stream_ids)
            .unwrap_or_default()
    }
}
