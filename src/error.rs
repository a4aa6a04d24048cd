//! Error types for the streaming engine.

use crate::stream::{Address, StreamId};
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Result type alias for batch and CLI operations.
pub type BatchResult<T> = std::result::Result<T, EngineError>;

/// Errors returned by stream operations.
///
/// Every variant is produced before any state is mutated, so a failed call
/// never leaves a partial update behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Caller is not the party the operation requires.
    #[error("{caller} is not authorized to act on stream {stream}")]
    Unauthorized { caller: Address, stream: StreamId },

    /// Operation requires an active stream.
    #[error("Stream {0} is not active")]
    NotActive(StreamId),

    /// Operation requires a paused stream.
    #[error("Stream {0} is not paused")]
    NotPaused(StreamId),

    /// Nothing has accrued since the last withdrawal.
    #[error("Nothing to withdraw from stream {0}")]
    NothingToWithdraw(StreamId),

    /// Zero amount, zero duration, self-stream, or out-of-range values.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The payer's custody balance cannot cover the escrow.
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// Unknown stream identifier.
    #[error("Stream {0} not found")]
    StreamNotFound(StreamId),

    /// The payer ledger must be initialized before creating streams.
    #[error("Ledger for {0} is not initialized")]
    LedgerNotInitialized(Address),

    /// Escrow holds less than the amount being released.
    #[error("Escrow shortfall: needed {needed}, escrowed {escrowed}")]
    EscrowShortfall { needed: u64, escrowed: u64 },
}

/// Errors that can occur while replaying a command batch.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A stream operation was rejected
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Invalid command record
    #[error("Invalid command at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: stream-engine <commands.csv> [events.csv]")]
    MissingArgument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = StreamError::Unauthorized {
            caller: Address::new("0xeve"),
            stream: StreamId(7),
        };
        assert_eq!(err.to_string(), "0xeve is not authorized to act on stream 7");

        let err = StreamError::InsufficientFunds {
            needed: 10,
            available: 3,
        };
        assert_eq!(err.to_string(), "Insufficient funds: needed 10, available 3");
    }

    #[test]
    fn test_stream_error_converts_into_engine_error() {
        let err: EngineError = StreamError::NotPaused(StreamId(2)).into();
        assert!(matches!(err, EngineError::Stream(StreamError::NotPaused(StreamId(2)))));
        assert_eq!(err.to_string(), "Stream 2 is not paused");
    }
}
