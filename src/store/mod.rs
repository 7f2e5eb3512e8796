//! Persistence seam for placed anchors.
//!
//! Stores assign ids in insertion order starting at 1 and push the latest
//! [`RING_CAPACITY`] anchors to every subscriber after each successful write.

pub mod json_file;
pub mod memory;
pub mod worker;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use worker::PersistenceWorker;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::anchor::Anchor;
use crate::error::Result;
use crate::ring::RING_CAPACITY;

pub trait AnchorStore: Send {
    /// Persists `anchor` and returns the id assigned to it.
    fn insert(&mut self, anchor: &Anchor) -> Result<i64>;

    /// The newest `n` anchors, oldest first.
    fn latest(&self, n: usize) -> Result<Vec<Anchor>>;

    /// Snapshots of the newest [`RING_CAPACITY`] anchors, pushed after each insert.
    fn subscribe(&mut self) -> Receiver<Vec<Anchor>>;
}

#[derive(Default)]
pub(crate) struct Subscribers {
    senders: Vec<Sender<Vec<Anchor>>>,
}

impl Subscribers {
    pub(crate) fn add(&mut self) -> Receiver<Vec<Anchor>> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, snapshot: &[Anchor]) {
        self.senders.retain(|tx| tx.send(snapshot.to_vec()).is_ok());
    }
}

pub(crate) fn tail(rows: &[Anchor], n: usize) -> Vec<Anchor> {
    rows[rows.len().saturating_sub(n)..].to_vec()
}

pub(crate) fn ring_tail(rows: &[Anchor]) -> Vec<Anchor> {
    tail(rows, RING_CAPACITY)
}
