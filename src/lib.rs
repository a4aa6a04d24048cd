//! # Stream Engine
//!
//! Linear payment streaming: a payer escrows a fixed amount that is released
//! to a payee second by second over a fixed window. The payee withdraws
//! whatever has accrued; the payer may pause and resume accrual but can never
//! take escrowed funds back.
//!
//! ## Design Principles
//!
//! - **Integer amounts**: smallest currency units as `u64`, `u128` intermediates
//! - **Explicit time**: every operation receives `now`; no background timers
//! - **All-or-nothing calls**: failures are detected before any mutation
//! - **Single owner**: streams live in one arena; ledgers hold only ids
//!
//! ## Example
//!
//! ```
//! use stream_engine::{Address, StreamingEngine};
//!
//! let payer = Address::new("0xa11ce");
//! let payee = Address::new("0xb0b");
//!
//! let mut engine = StreamingEngine::new();
//! engine.custody_mut().credit(&payer, 1_000).unwrap();
//! engine.init_payer_ledger(&payer);
//!
//! let id = engine
//!     .create_stream(&payer, &payee, 1_000, 100, "retainer", 0)
//!     .unwrap();
//! assert_eq!(engine.get_withdrawable_amount(id, 30).unwrap(), 300);
//! assert_eq!(engine.withdraw_from_stream(&payee, id, 30).unwrap(), 300);
//! ```

pub mod accrual;
pub mod batch;
pub mod command;
pub mod custody;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod progress;
pub mod store;
pub mod stream;

pub use batch::BatchProcessor;
pub use command::{CommandKind, CommandRecord, ParsedCommand};
pub use custody::{Custody, CustodyAccount, InMemoryCustody};
pub use engine::{StreamInfo, StreamingEngine};
pub use error::{BatchResult, EngineError, Result, StreamError};
pub use event::{EventLog, StreamCreated, StreamEvent, Withdrawn};
pub use ledger::{AccountOverview, Ledgers, PayeeLedger, PayeeStats, PayerLedger, PayerStats};
pub use progress::Percent4;
pub use store::StreamStore;
pub use stream::{Address, Stream, StreamId, StreamStatus, Timestamp};
