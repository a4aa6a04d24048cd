//! Accrual calculation.
//!
//! Pure functions over a stream snapshot and the caller's `now`. Paused time
//! inside the stream window never accrues: completed pauses are subtracted via
//! `paused_elapsed`, and a pause in progress freezes the horizon at
//! `pause_started_at`.

use crate::stream::{Stream, StreamStatus, Timestamp};

/// Seconds of active (non-paused) streaming between `start_time` and `now`,
/// bounded by the stream window.
pub fn active_elapsed(stream: &Stream, now: Timestamp) -> u64 {
    let horizon = match (stream.status, stream.pause_started_at) {
        (StreamStatus::Paused, Some(started)) => started.min(now),
        _ => now,
    };

    let elapsed = stream.clamp_to_window(horizon) - stream.start_time;
    elapsed.saturating_sub(stream.paused_elapsed)
}

/// Total amount released by the schedule as of `now`, in `[0, total_amount]`.
pub fn accrued(stream: &Stream, now: Timestamp) -> u64 {
    let active = active_elapsed(stream, now);
    let duration = stream.duration();
    if active >= duration {
        return stream.total_amount;
    }

    // u128 keeps `total * active` from overflowing; the quotient is below
    // `total_amount` because `active < duration`.
    let amount = stream.total_amount as u128 * active as u128 / duration as u128;
    u64::try_from(amount).unwrap_or(stream.total_amount)
}

/// Amount the payee could withdraw at `now`.
///
/// Returns 0 for completed streams. For paused streams this is the value
/// frozen when the pause began.
pub fn withdrawable(stream: &Stream, now: Timestamp) -> u64 {
    if stream.status == StreamStatus::Completed {
        return 0;
    }

    accrued(stream, now)
        .saturating_sub(stream.withdrawn_amount)
        .min(stream.remaining())
}
