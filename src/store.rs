//! Arena of stream records keyed by identifier.
//!
//! The store is the only owner of stream data. Ledgers refer to streams by
//! `StreamId` and read through here. Records are never removed; completed
//! streams stay queryable.

use crate::error::{Result, StreamError};
use crate::stream::{Address, Stream, StreamId, Timestamp};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct StreamStore {
    streams: HashMap<StreamId, Stream>,
    last_id: u64,
}

impl StreamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier the next inserted stream will receive.
    pub fn next_id(&self) -> StreamId {
        StreamId(self.last_id + 1)
    }

    /// Registers a new active stream and returns its identifier.
    pub fn insert(
        &mut self,
        payer: Address,
        payee: Address,
        total_amount: u64,
        start_time: Timestamp,
        end_time: Timestamp,
        description: String,
    ) -> StreamId {
        let id = self.next_id();
        self.last_id = id.0;
        let stream = Stream::new(
            id,
            payer,
            payee,
            total_amount,
            start_time,
            end_time,
            description,
        );
        self.streams.insert(id, stream);
        id
    }

    pub fn get(&self, id: StreamId) -> Result<&Stream> {
        self.streams.get(&id).ok_or(StreamError::StreamNotFound(id))
    }

    pub fn contains(&self, id: StreamId) -> bool {
        self.streams.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// All streams in identifier order.
    pub fn iter_sorted(&self) -> Vec<&Stream> {
        let mut streams: Vec<_> = self.streams.values().collect();
        streams.sort_by_key(|s| s.id);
        streams
    }

    pub fn pause(&mut self, id: StreamId, now: Timestamp) -> Result<()> {
        self.get_mut(id)?.pause(now)
    }

    pub fn resume(&mut self, id: StreamId, now: Timestamp) -> Result<()> {
        self.get_mut(id)?.resume(now)
    }

    pub fn record_withdrawal(&mut self, id: StreamId, amount: u64) -> Result<()> {
        self.get_mut(id)?.record_withdrawal(amount)
    }

    fn get_mut(&mut self, id: StreamId) -> Result<&mut Stream> {
        self.streams
            .get_mut(&id)
            .ok_or(StreamError::StreamNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamStatus;

    fn insert(store: &mut StreamStore) -> StreamId {
        store.insert(
            Address::new("0xa11ce"),
            Address::new("0xb0b"),
            1_000,
            0,
            1_000,
            "salary".to_string(),
        )
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut store = StreamStore::new();
        assert!(store.is_empty());
        assert_eq!(insert(&mut store), StreamId(1));
        assert_eq!(insert(&mut store), StreamId(2));
        assert_eq!(store.next_id(), StreamId(3));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_stream() {
        let mut store = StreamStore::new();
        assert_eq!(
            store.get(StreamId(9)).unwrap_err(),
            StreamError::StreamNotFound(StreamId(9))
        );
        assert_eq!(
            store.pause(StreamId(9), 0).unwrap_err(),
            StreamError::StreamNotFound(StreamId(9))
        );
    }

    #[test]
    fn test_transitions_apply_to_record() {
        let mut store = StreamStore::new();
        let id = insert(&mut store);

        store.pause(id, 10).unwrap();
        assert_eq!(store.get(id).unwrap().status, StreamStatus::Paused);
        store.resume(id, 20).unwrap();
        assert_eq!(store.get(id).unwrap().paused_elapsed, 10);

        store.record_withdrawal(id, 1_000).unwrap();
        let stream = store.get(id).unwrap();
        assert_eq!(stream.status, StreamStatus::Completed);
        assert!(store.contains(id));
    }

    #[test]
    fn test_iter_sorted() {
        let mut store = StreamStore::new();
        for _ in 0..5 {
            insert(&mut store);
        }
        let ids: Vec<_> = store.iter_sorted().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
