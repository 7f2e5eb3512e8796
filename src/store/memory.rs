use crossbeam_channel::Receiver;

use super::{AnchorStore, Subscribers, ring_tail, tail};
use crate::anchor::Anchor;
use crate::error::{AnchorError, Result};

/// Volatile store, also used to simulate an unreachable database.
#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<Anchor>,
    next_id: i64,
    offline: bool,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl AnchorStore for MemoryStore {
    fn insert(&mut self, anchor: &Anchor) -> Result<i64> {
        if self.offline {
            return Err(AnchorError::PersistenceUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let mut row = anchor.clone();
        row.id = Some(id);
        self.rows.push(row);
        self.subscribers.publish(&ring_tail(&self.rows));
        Ok(id)
    }

    fn latest(&self, n: usize) -> Result<Vec<Anchor>> {
        if self.offline {
            return Err(AnchorError::PersistenceUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(tail(&self.rows, n))
    }

    fn subscribe(&mut self) -> Receiver<Vec<Anchor>> {
        self.subscribers.add()
    }
}
