//! Command models for CSV parsing and internal representation.

use crate::stream::{Address, StreamId, Timestamp};
use serde::Deserialize;

/// Raw command record as read from CSV.
///
/// Columns not used by an operation may be left empty.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    /// Operation: fund, init_payer, init_payee, create, pause, resume, withdraw
    pub op: String,

    /// Caller's clock reading for this call
    pub time: Timestamp,

    /// Calling address
    pub caller: String,

    /// Target stream (pause, resume, withdraw)
    pub stream: Option<u64>,

    /// Payee address (create)
    pub counterparty: Option<String>,

    /// Amount in smallest units (fund, create)
    pub amount: Option<u64>,

    /// Stream duration in seconds (create)
    pub duration: Option<u64>,

    /// Free-form label (create)
    pub description: Option<String>,
}

impl CommandRecord {
    /// Parses the raw CSV record into a typed command.
    ///
    /// Returns `None` for unknown operations or missing required columns.
    pub fn parse(&self) -> Option<ParsedCommand> {
        let op = self.op.trim().to_lowercase();
        let caller = self.caller.trim();
        if caller.is_empty() {
            return None;
        }

        let kind = match op.as_str() {
            "fund" => CommandKind::Fund {
                amount: self.amount?,
            },
            "init_payer" => CommandKind::InitPayer,
            "init_payee" => CommandKind::InitPayee,
            "create" => CommandKind::Create {
                payee: self.counterparty_address()?,
                amount: self.amount?,
                duration: self.duration?,
                description: self
                    .description
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
            },
            "pause" => CommandKind::Pause(StreamId(self.stream?)),
            "resume" => CommandKind::Resume(StreamId(self.stream?)),
            "withdraw" => CommandKind::Withdraw(StreamId(self.stream?)),
            _ => return None,
        };

        Some(ParsedCommand {
            time: self.time,
            caller: Address::new(caller),
            kind,
        })
    }

    fn counterparty_address(&self) -> Option<Address> {
        let raw = self.counterparty.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Address::new(raw))
    }
}

/// A parsed and validated command ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub time: Timestamp,
    pub caller: Address,
    pub kind: CommandKind,
}

/// Command variants with associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Credit the caller's custody balance.
    Fund { amount: u64 },

    InitPayer,

    InitPayee,

    /// Open a stream from the caller to `payee`.
    Create {
        payee: Address,
        amount: u64,
        duration: u64,
        description: String,
    },

    Pause(StreamId),

    Resume(StreamId),

    /// Withdraw everything currently accrued.
    Withdraw(StreamId),
}
