//! Domain events emitted by the engine.
//!
//! The log is append-only. The engine never reads it back; it exists for
//! external indexers.

use crate::stream::{Address, StreamId, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamCreated {
    pub payer: Address,
    pub payee: Address,
    pub stream_id: StreamId,
    pub amount: u64,
    pub start: Timestamp,
    pub end: Timestamp,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Withdrawn {
    pub payee: Address,
    pub stream_id: StreamId,
    pub amount: u64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Created(StreamCreated),
    Withdrawn(Withdrawn),
}

impl StreamEvent {
    pub fn stream_id(&self) -> StreamId {
        match self {
            StreamEvent::Created(e) => e.stream_id,
            StreamEvent::Withdrawn(e) => e.stream_id,
        }
    }

    /// Flattens the event into a single CSV-friendly row.
    pub fn to_row(&self) -> EventRow<'_> {
        match self {
            StreamEvent::Created(e) => EventRow {
                event: "created",
                stream: e.stream_id,
                payer: Some(&e.payer),
                payee: &e.payee,
                amount: e.amount,
                start: Some(e.start),
                end: Some(e.end),
                timestamp: e.start,
                description: Some(&e.description),
            },
            StreamEvent::Withdrawn(e) => EventRow {
                event: "withdrawn",
                stream: e.stream_id,
                payer: None,
                payee: &e.payee,
                amount: e.amount,
                start: None,
                end: None,
                timestamp: e.timestamp,
                description: None,
            },
        }
    }
}

/// Uniform row shape for serializing mixed events.
#[derive(Debug, Serialize)]
pub struct EventRow<'a> {
    pub event: &'static str,
    pub stream: StreamId,
    pub payer: Option<&'a Address>,
    pub payee: &'a Address,
    pub amount: u64,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub timestamp: Timestamp,
    pub description: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<StreamEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: StreamEvent) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[StreamEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = EventLog::new();
        log.append(StreamEvent::Created(StreamCreated {
            payer: Address::new("0xa11ce"),
            payee: Address::new("0xb0b"),
            stream_id: StreamId(1),
            amount: 100,
            start: 0,
            end: 100,
            description: "rent".to_string(),
        }));
        log.append(StreamEvent::Withdrawn(Withdrawn {
            payee: Address::new("0xb0b"),
            stream_id: StreamId(1),
            amount: 40,
            timestamp: 40,
        }));

        assert_eq!(log.len(), 2);
        let ids: Vec<_> = log.as_slice().iter().map(StreamEvent::stream_id).collect();
        assert_eq!(ids, vec![StreamId(1), StreamId(1)]);
        assert!(matches!(log.as_slice()[1], StreamEvent::Withdrawn(_)));
    }

    #[test]
    fn test_withdrawn_row_has_no_payer() {
        let event = StreamEvent::Withdrawn(Withdrawn {
            payee: Address::new("0xb0b"),
            stream_id: StreamId(3),
            amount: 7,
            timestamp: 99,
        });
        let row = event.to_row();
        assert_eq!(row.event, "withdrawn");
        assert!(row.payer.is_none());
        assert_eq!(row.timestamp, 99);
    }
}
