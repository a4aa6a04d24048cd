//! Core streaming engine.
//!
//! Authorizes callers against stream records, consults the accrual
//! calculator, and applies store, ledger, custody and event updates as one
//! unit. Every check runs before the first mutation, and the only fallible
//! mutation (the custody call) runs first, so a failed call changes nothing.

use crate::accrual;
use crate::custody::{Custody, InMemoryCustody};
use crate::error::{Result, StreamError};
use crate::event::{EventLog, StreamCreated, StreamEvent, Withdrawn};
use crate::ledger::{AccountOverview, Ledgers, PayeeStats, PayerStats};
use crate::progress::Percent4;
use crate::store::StreamStore;
use crate::stream::{Address, Stream, StreamId, StreamStatus, Timestamp};
use log::{debug, info};

/// Read-only snapshot of a stream, in the order external callers expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub payer: Address,
    pub payee: Address,
    pub total_amount: u64,
    pub withdrawn_amount: u64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub rate: u64,
    pub status: StreamStatus,
    pub description: String,
}

impl From<&Stream> for StreamInfo {
    fn from(stream: &Stream) -> Self {
        StreamInfo {
            payer: stream.payer.clone(),
            payee: stream.payee.clone(),
            total_amount: stream.total_amount,
            withdrawn_amount: stream.withdrawn_amount,
            start_time: stream.start_time,
            end_time: stream.end_time,
            rate: stream.rate,
            status: stream.status,
            description: stream.description.clone(),
        }
    }
}

/// The payment streaming engine.
///
/// Operations take `now` explicitly; the engine has no clock or timers of its
/// own. A stream past `end_time` stays `Active` until the payee drains it.
///
/// Mutating calls take `&mut self`, so a host sharing the engine across
/// threads must serialize writers (e.g. behind a `RwLock`); reads then see
/// either the state before or after a call, never in between.
pub struct StreamingEngine<C: Custody = InMemoryCustody> {
    store: StreamStore,
    ledgers: Ledgers,
    custody: C,
    events: EventLog,
}

impl StreamingEngine<InMemoryCustody> {
    /// Creates an empty engine backed by in-memory custody.
    pub fn new() -> Self {
        Self::with_custody(InMemoryCustody::new())
    }
}

impl Default for StreamingEngine<InMemoryCustody> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Custody> StreamingEngine<C> {
    /// Creates an empty engine backed by the given custody.
    pub fn with_custody(custody: C) -> Self {
        StreamingEngine {
            store: StreamStore::new(),
            ledgers: Ledgers::new(),
            custody,
            events: EventLog::new(),
        }
    }

    /// Custody backing the escrow.
    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Mutable custody access, for funding balances outside of streams.
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    /// Read-only view of every stream record.
    pub fn store(&self) -> &StreamStore {
        &self.store
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[StreamEvent] {
        self.events.as_slice()
    }

    /// Creates the caller's payer ledger. Calling it again is a no-op.
    pub fn init_payer_ledger(&mut self, caller: &Address) {
        if self.ledgers.init_payer(caller) {
            debug!("Initialized payer ledger for {}", caller);
        } else {
            debug!("Payer ledger for {} already initialized", caller);
        }
    }

    /// Creates the caller's payee ledger. Calling it again is a no-op.
    pub fn init_payee_ledger(&mut self, caller: &Address) {
        if self.ledgers.init_payee(caller) {
            debug!("Initialized payee ledger for {}", caller);
        } else {
            debug!("Payee ledger for {} already initialized", caller);
        }
    }

    /// Escrows `total_amount` from the caller and starts a stream to `payee`
    /// running from `now` for `duration` seconds.
    pub fn create_stream(
        &mut self,
        caller: &Address,
        payee: &Address,
        total_amount: u64,
        duration: u64,
        description: &str,
        now: Timestamp,
    ) -> Result<StreamId> {
        let payer_ledger = self
            .ledgers
            .payer(caller)
            .ok_or_else(|| StreamError::LedgerNotInitialized(caller.clone()))?;
        let fits_ledger = payer_ledger.can_deposit(total_amount);
        if caller == payee {
            return Err(StreamError::InvalidArgument(
                "payee must differ from payer".to_string(),
            ));
        }
        if total_amount == 0 {
            return Err(StreamError::InvalidArgument(
                "total amount must be positive".to_string(),
            ));
        }
        if duration == 0 {
            return Err(StreamError::InvalidArgument(
                "duration must be positive".to_string(),
            ));
        }
        let end_time = now.checked_add(duration).ok_or_else(|| {
            StreamError::InvalidArgument(format!(
                "duration {} overflows the clock at {}",
                duration, now
            ))
        })?;
        if !fits_ledger {
            return Err(StreamError::InvalidArgument(format!(
                "deposit of {} overflows total deposited by {}",
                total_amount, caller
            )));
        }

        self.custody.lock(caller, total_amount)?;

        let id = self.store.insert(
            caller.clone(),
            payee.clone(),
            total_amount,
            now,
            end_time,
            description.to_string(),
        );
        let recorded = self
            .ledgers
            .payer_mut(caller)
            .map_or(false, |ledger| ledger.record_stream(id, total_amount));
        debug_assert!(recorded, "payer ledger checked before lock");
        self.ledgers.payee_entry(payee).record_stream(id);
        self.events.append(StreamEvent::Created(StreamCreated {
            payer: caller.clone(),
            payee: payee.clone(),
            stream_id: id,
            amount: total_amount,
            start: now,
            end: end_time,
            description: description.to_string(),
        }));

        info!(
            "Created stream {}: {} -> {}, {} over {}s",
            id, caller, payee, total_amount, duration
        );
        Ok(id)
    }

    /// Freezes accrual. Payer only.
    pub fn pause_stream(&mut self, caller: &Address, id: StreamId, now: Timestamp) -> Result<()> {
        self.authorize_payer(caller, id)?;
        self.store.pause(id, now)?;
        debug!("Paused stream {} at {}", id, now);
        Ok(())
    }

    /// Resumes accrual after a pause. Payer only.
    pub fn resume_stream(&mut self, caller: &Address, id: StreamId, now: Timestamp) -> Result<()> {
        self.authorize_payer(caller, id)?;
        self.store.resume(id, now)?;
        debug!("Resumed stream {} at {}", id, now);
        Ok(())
    }

    /// Releases everything accrued but unclaimed to the payee. Payee only.
    ///
    /// Returns the amount released.
    pub fn withdraw_from_stream(
        &mut self,
        caller: &Address,
        id: StreamId,
        now: Timestamp,
    ) -> Result<u64> {
        let stream = self.store.get(id)?;
        if &stream.payee != caller {
            return Err(StreamError::Unauthorized {
                caller: caller.clone(),
                stream: id,
            });
        }
        match stream.status {
            StreamStatus::Completed => return Err(StreamError::NothingToWithdraw(id)),
            StreamStatus::Paused => return Err(StreamError::NotActive(id)),
            StreamStatus::Active => {}
        }

        let amount = accrual::withdrawable(stream, now);
        if amount == 0 {
            return Err(StreamError::NothingToWithdraw(id));
        }
        let payer = stream.payer.clone();
        let payee = stream.payee.clone();

        self.ledgers.check_payout(&payer, &payee, amount)?;
        self.custody.release(&payer, amount, &payee)?;

        self.store.record_withdrawal(id, amount)?;
        let earned = self
            .ledgers
            .payee_entry(&payee)
            .record_withdrawal(id, amount);
        let released = self
            .ledgers
            .payer_mut(&payer)
            .map_or(true, |ledger| ledger.record_release(amount));
        debug_assert!(earned && released, "ledger totals checked before release");
        self.events.append(StreamEvent::Withdrawn(Withdrawn {
            payee: payee.clone(),
            stream_id: id,
            amount,
            timestamp: now,
        }));

        debug!("Stream {}: {} withdrew {} at {}", id, payee, amount, now);
        Ok(amount)
    }

    /// Snapshot of the stream's record.
    pub fn get_stream_info(&self, id: StreamId) -> Result<StreamInfo> {
        self.store.get(id).map(StreamInfo::from)
    }

    /// Amount the payee could withdraw at `now`; frozen while paused.
    pub fn get_withdrawable_amount(&self, id: StreamId, now: Timestamp) -> Result<u64> {
        self.store.get(id).map(|s| accrual::withdrawable(s, now))
    }

    /// Share of the stream already withdrawn, in percent.
    pub fn get_stream_progress(&self, id: StreamId) -> Result<Percent4> {
        self.store
            .get(id)
            .map(|s| Percent4::of(s.withdrawn_amount, s.total_amount))
    }

    /// Deposited and released totals; zero for uninitialized payers.
    pub fn get_payer_stats(&self, owner: &Address) -> PayerStats {
        self.ledgers.payer_stats(owner)
    }

    /// Earned and withdrawn totals; zero for unknown payees.
    pub fn get_payee_stats(&self, owner: &Address) -> PayeeStats {
        self.ledgers.payee_stats(owner)
    }

    /// Streams the address created, in id order.
    pub fn get_payer_streams(&self, owner: &Address) -> Vec<StreamId> {
        self.ledgers.payer_streams(owner)
    }

    /// Streams paying the address, in id order.
    pub fn get_payee_streams(&self, owner: &Address) -> Vec<StreamId> {
        self.ledgers.payee_streams(owner)
    }

    /// Both roles' streams and totals for one address.
    pub fn get_account_overview(&self, owner: &Address) -> AccountOverview {
        AccountOverview {
            payer_streams: self.get_payer_streams(owner),
            payee_streams: self.get_payee_streams(owner),
            payer_stats: self.get_payer_stats(owner),
            payee_stats: self.get_payee_stats(owner),
        }
    }

    fn authorize_payer(&self, caller: &Address, id: StreamId) -> Result<()> {
        let stream = self.store.get(id)?;
        if &stream.payer != caller {
            return Err(StreamError::Unauthorized {
                caller: caller.clone(),
                stream: id,
            });
        }
        Ok(())
    }
}
