//! Batch replay of stream commands.
//!
//! Reads commands from CSV in order, drives the engine with each row's
//! `time` as `now`, and writes the resulting stream states. Rejected commands
//! are logged at warn level and skipped; they never stop the batch.

use crate::accrual;
use crate::command::{CommandKind, CommandRecord, ParsedCommand};
use crate::engine::StreamingEngine;
use crate::error::{BatchResult, EngineError};
use crate::progress::Percent4;
use crate::stream::Timestamp;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::{Read, Write};

/// Replays command batches against a [`StreamingEngine`].
///
/// # Clock
///
/// Row times must be non-decreasing. A row that would move the clock
/// backwards is rejected and leaves the clock alone. Every other parsed row
/// advances the clock, even when the engine then rejects the command, so
/// output is evaluated at the time of the last such row.
#[derive(Default)]
pub struct BatchProcessor {
    engine: StreamingEngine,
    clock: Timestamp,
}

impl BatchProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &StreamingEngine {
        &self.engine
    }

    /// Time of the last parsed row that did not go backwards.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Processes commands from a CSV reader in streaming fashion.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> BatchResult<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<CommandRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => match record.parse() {
                    Some(command) => {
                        if let Err(e) = self.process_command(command, row_num) {
                            warn!("Row {}: {}", row_num, e);
                        }
                    }
                    None => warn!("Row {}: Failed to parse command record", row_num),
                },
                Err(e) => warn!("Row {}: CSV parse error: {}", row_num, e),
            }
        }

        Ok(())
    }

    /// Executes a single parsed command.
    fn process_command(&mut self, command: ParsedCommand, row: usize) -> BatchResult<()> {
        if command.time < self.clock {
            return Err(EngineError::InvalidRecord {
                row,
                message: format!(
                    "time {} is earlier than the current clock {}",
                    command.time, self.clock
                ),
            });
        }
        let now = command.time;
        self.clock = now;
        let caller = &command.caller;

        match command.kind {
            CommandKind::Fund { amount } => {
                self.engine.custody_mut().credit(caller, amount)?;
                debug!("Row {}: Funded {} with {}", row, caller, amount);
            }
            CommandKind::InitPayer => self.engine.init_payer_ledger(caller),
            CommandKind::InitPayee => self.engine.init_payee_ledger(caller),
            CommandKind::Create {
                payee,
                amount,
                duration,
                description,
            } => {
                let id = self
                    .engine
                    .create_stream(caller, &payee, amount, duration, &description, now)?;
                debug!("Row {}: Created stream {}", row, id);
            }
            CommandKind::Pause(id) => self.engine.pause_stream(caller, id, now)?,
            CommandKind::Resume(id) => self.engine.resume_stream(caller, id, now)?,
            CommandKind::Withdraw(id) => {
                let amount = self.engine.withdraw_from_stream(caller, id, now)?;
                debug!("Row {}: Withdrew {} from stream {}", row, amount, id);
            }
        }

        Ok(())
    }

    /// Writes final stream states to CSV.
    ///
    /// Output is sorted by stream id. `withdrawable` is evaluated at the
    /// batch clock.
    pub fn write_streams<W: Write>(&self, writer: W) -> BatchResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "stream",
            "payer",
            "payee",
            "total",
            "withdrawn",
            "withdrawable",
            "start",
            "end",
            "rate",
            "status",
            "progress",
        ])?;

        for stream in self.engine.store().iter_sorted() {
            csv_writer.write_record([
                stream.id.to_string(),
                stream.payer.to_string(),
                stream.payee.to_string(),
                stream.total_amount.to_string(),
                stream.withdrawn_amount.to_string(),
                accrual::withdrawable(stream, self.clock).to_string(),
                stream.start_time.to_string(),
                stream.end_time.to_string(),
                stream.rate.to_string(),
                stream.status.to_string(),
                Percent4::of(stream.withdrawn_amount, stream.total_amount).to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the event log to CSV, oldest first.
    pub fn write_events<W: Write>(&self, writer: W) -> BatchResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for event in self.engine.events() {
            csv_writer.serialize(event.to_row())?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
