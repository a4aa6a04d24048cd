//! Stream record model and state transitions.
//!
//! Maintains the invariant: `withdrawn_amount <= total_amount` at all times.

use crate::error::{Result, StreamError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds on the caller-supplied monotonic clock.
pub type Timestamp = u64;

/// A principal identifier (payer or payee).
///
/// Addresses are trimmed and lowercased so `0xABC` and ` 0xabc ` name the
/// same party.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> Self {
        Address(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Address::new(raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique stream identifier, assigned sequentially by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub u64);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a stream.
///
/// `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Active,
    Paused,
    Completed,
}

impl StreamStatus {
    /// Wire encoding used by external callers: Active=1, Paused=2, Completed=3.
    pub fn code(self) -> u8 {
        match self {
            StreamStatus::Active => 1,
            StreamStatus::Paused => 2,
            StreamStatus::Completed => 3,
        }
    }
}

impl TryFrom<u8> for StreamStatus {
    type Error = StreamError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(StreamStatus::Active),
            2 => Ok(StreamStatus::Paused),
            3 => Ok(StreamStatus::Completed),
            other => Err(StreamError::InvalidArgument(format!(
                "unknown status code {}",
                other
            ))),
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamStatus::Active => "active",
            StreamStatus::Paused => "paused",
            StreamStatus::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A linear payment agreement between one payer and one payee.
///
/// # Invariants
///
/// - `payer != payee`
/// - `end_time > start_time`
/// - `withdrawn_amount <= total_amount`, and it never decreases
/// - `pause_started_at.is_some()` exactly when `status == Paused`
/// - Once `status == Completed`, no field changes again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub id: StreamId,
    pub payer: Address,
    pub payee: Address,
    pub total_amount: u64,
    pub withdrawn_amount: u64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,

    /// `total_amount / duration`, informational. Accrual itself is computed
    /// proportionally so integer truncation never strands funds.
    pub rate: u64,

    pub status: StreamStatus,

    /// Seconds spent paused inside `[start_time, end_time]`, summed over
    /// completed pause intervals.
    pub paused_elapsed: u64,

    /// Set while paused.
    pub pause_started_at: Option<Timestamp>,

    pub description: String,
}

impl Stream {
    /// Creates an active stream starting at `start_time`.
    ///
    /// Argument validation lives in the engine; this only derives the rate.
    pub fn new(
        id: StreamId,
        payer: Address,
        payee: Address,
        total_amount: u64,
        start_time: Timestamp,
        end_time: Timestamp,
        description: String,
    ) -> Self {
        let duration = end_time.saturating_sub(start_time).max(1);
        Stream {
            id,
            payer,
            payee,
            total_amount,
            withdrawn_amount: 0,
            start_time,
            end_time,
            rate: total_amount / duration,
            status: StreamStatus::Active,
            paused_elapsed: 0,
            pause_started_at: None,
            description,
        }
    }

    pub fn duration(&self) -> u64 {
        self.end_time - self.start_time
    }

    /// Amount still held in escrow for this stream.
    pub fn remaining(&self) -> u64 {
        self.total_amount - self.withdrawn_amount
    }

    pub fn is_completed(&self) -> bool {
        self.status == StreamStatus::Completed
    }

    /// Clamps `t` into the stream window.
    pub fn clamp_to_window(&self, t: Timestamp) -> Timestamp {
        t.clamp(self.start_time, self.end_time)
    }

    /// Active -> Paused.
    pub fn pause(&mut self, now: Timestamp) -> Result<()> {
        if self.status != StreamStatus::Active {
            return Err(StreamError::NotActive(self.id));
        }

        self.status = StreamStatus::Paused;
        self.pause_started_at = Some(now);
        Ok(())
    }

    /// Paused -> Active.
    ///
    /// Only the part of the pause that overlaps the stream window counts
    /// towards `paused_elapsed`; time paused after `end_time` has nothing to
    /// freeze.
    pub fn resume(&mut self, now: Timestamp) -> Result<()> {
        let started = match (self.status, self.pause_started_at) {
            (StreamStatus::Paused, Some(started)) => started,
            _ => return Err(StreamError::NotPaused(self.id)),
        };

        let paused_for = self
            .clamp_to_window(now)
            .saturating_sub(self.clamp_to_window(started));
        self.paused_elapsed = self.paused_elapsed.saturating_add(paused_for);
        self.pause_started_at = None;
        self.status = StreamStatus::Active;
        Ok(())
    }

    /// Active -> Active | Completed.
    ///
    /// Completes the stream when the last unit leaves escrow.
    pub fn record_withdrawal(&mut self, amount: u64) -> Result<()> {
        if self.status != StreamStatus::Active {
            return Err(StreamError::NotActive(self.id));
        }
        if amount == 0 {
            return Err(StreamError::NothingToWithdraw(self.id));
        }
        if amount > self.remaining() {
            return Err(StreamError::InvalidArgument(format!(
                "withdrawal of {} exceeds remaining {} on stream {}",
                amount,
                self.remaining(),
                self.id
            )));
        }

        self.withdrawn_amount += amount;
        if self.withdrawn_amount == self.total_amount {
            self.status = StreamStatus::Completed;
        }
        Ok(())
    }

    /// Verifies the record's structural invariants.
    pub fn check_invariant(&self) -> bool {
        self.withdrawn_amount <= self.total_amount
            && self.end_time > self.start_time
            && self.payer != self.payee
            && self.pause_started_at.is_some() == (self.status == StreamStatus::Paused)
            && (self.status != StreamStatus::Completed || self.withdrawn_amount == self.total_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(total: u64, start: Timestamp, end: Timestamp) -> Stream {
        Stream::new(
            StreamId(1),
            Address::new("0xa11ce"),
            Address::new("0xb0b"),
            total,
            start,
            end,
            "payroll".to_string(),
        )
    }

    #[test]
    fn test_new_stream_is_active_and_empty() {
        let s = stream(2_592_000, 0, 2_592_000);
        assert_eq!(s.status, StreamStatus::Active);
        assert_eq!(s.withdrawn_amount, 0);
        assert_eq!(s.paused_elapsed, 0);
        assert_eq!(s.rate, 1);
        assert!(s.check_invariant());
    }

    #[test]
    fn test_rate_truncates() {
        let s = stream(100, 0, 3);
        assert_eq!(s.rate, 33);
        let s = stream(10, 0, 100);
        assert_eq!(s.rate, 0);
    }

    #[test]
    fn test_address_normalizes() {
        assert_eq!(Address::new("  0xABC "), Address::new("0xabc"));
        assert_eq!(Address::from("0xAbC").as_str(), "0xabc");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(StreamStatus::Active.code(), 1);
        assert_eq!(StreamStatus::Paused.code(), 2);
        assert_eq!(StreamStatus::Completed.code(), 3);
        assert_eq!(StreamStatus::try_from(2).unwrap(), StreamStatus::Paused);
        assert!(StreamStatus::try_from(0).is_err());
        assert!(StreamStatus::try_from(4).is_err());
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut s = stream(1_000, 0, 1_000);
        s.pause(100).unwrap();
        assert_eq!(s.status, StreamStatus::Paused);
        assert_eq!(s.pause_started_at, Some(100));
        assert!(s.check_invariant());

        s.resume(150).unwrap();
        assert_eq!(s.status, StreamStatus::Active);
        assert_eq!(s.pause_started_at, None);
        assert_eq!(s.paused_elapsed, 50);
        assert!(s.check_invariant());
    }

    #[test]
    fn test_pause_requires_active() {
        let mut s = stream(1_000, 0, 1_000);
        s.pause(10).unwrap();
        assert_eq!(s.pause(20), Err(StreamError::NotActive(StreamId(1))));
        assert_eq!(s.pause_started_at, Some(10));
    }

    #[test]
    fn test_resume_requires_paused() {
        let mut s = stream(1_000, 0, 1_000);
        assert_eq!(s.resume(20), Err(StreamError::NotPaused(StreamId(1))));
        assert_eq!(s.paused_elapsed, 0);
    }

    #[test]
    fn test_resume_counts_only_pause_inside_window() {
        let mut s = stream(1_000, 100, 1_100);
        s.pause(1_000).unwrap();
        s.resume(5_000).unwrap();
        assert_eq!(s.paused_elapsed, 100);

        let mut s = stream(1_000, 100, 1_100);
        s.pause(2_000).unwrap();
        s.resume(3_000).unwrap();
        assert_eq!(s.paused_elapsed, 0);
    }

    #[test]
    fn test_withdrawal_completes_on_exhaustion() {
        let mut s = stream(100, 0, 100);
        s.record_withdrawal(40).unwrap();
        assert_eq!(s.status, StreamStatus::Active);
        s.record_withdrawal(60).unwrap();
        assert_eq!(s.status, StreamStatus::Completed);
        assert_eq!(s.remaining(), 0);
        assert!(s.check_invariant());

        assert_eq!(s.record_withdrawal(1), Err(StreamError::NotActive(StreamId(1))));
        assert_eq!(s.withdrawn_amount, 100);
    }

    #[test]
    fn test_withdrawal_rejects_zero_and_overdraw() {
        let mut s = stream(100, 0, 100);
        assert_eq!(s.record_withdrawal(0), Err(StreamError::NothingToWithdraw(StreamId(1))));
        assert!(matches!(s.record_withdrawal(101), Err(StreamError::InvalidArgument(_))));
        assert_eq!(s.withdrawn_amount, 0);
    }

    #[test]
    fn test_withdrawal_rejected_while_paused() {
        let mut s = stream(100, 0, 100);
        s.pause(50).unwrap();
        assert_eq!(s.record_withdrawal(10), Err(StreamError::NotActive(StreamId(1))));
        assert_eq!(s.withdrawn_amount, 0);
    }
}
