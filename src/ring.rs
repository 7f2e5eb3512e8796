use std::sync::Arc;

use parking_lot::Mutex;

use crate::anchor::{Anchor, Detach};

pub const RING_CAPACITY: usize = 5;

/// Fixed-size ring of the most recently placed anchors.
///
/// Each insert overwrites the slot under the cursor and advances the cursor
/// by one, so once the ring has wrapped, slot order no longer matches
/// placement order. Use [`AnchorRing::iter_oldest_first`] when chronology
/// matters.
pub struct AnchorRing<H: Detach = Anchor> {
    slots: [Option<H>; RING_CAPACITY],
    cursor: usize,
    total_inserted: u64,
    /// Highest store id applied by [`AnchorRing::rebuild_from`].
    applied_store_id: u64,
    /// Inserts since the last applied snapshot.
    pending_local: u64,
}

/// Result of applying a store snapshot to the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { live: usize },
    /// Snapshot is no newer than the last one applied.
    Stale,
    /// Snapshot held no anchors with store ids.
    Empty,
}

pub type SharedRing<H = Anchor> = Arc<Mutex<AnchorRing<H>>>;

impl<H: Detach> AnchorRing<H> {
    pub fn new() -> AnchorRing<H> {
        AnchorRing {
            slots: std::array::from_fn(|_| None),
            cursor: 0,
            total_inserted: 0,
            applied_store_id: 0,
            pending_local: 0,
        }
    }

    pub fn into_shared(self) -> SharedRing<H> {
        Arc::new(Mutex::new(self))
    }

    /// Writes `anchor` to the cursor slot, detaching the previous occupant,
    /// and returns the slot index written.
    pub fn insert(&mut self, anchor: H) -> usize {
        let (slot, previous) = self.swap_in(anchor);
        if let Some(previous) = previous {
            previous.detach();
        }
        slot
    }

    /// Like [`AnchorRing::insert`] but hands the evicted occupant back to the
    /// caller instead of detaching it.
    pub fn swap_in(&mut self, anchor: H) -> (usize, Option<H>) {
        let slot = self.cursor;
        let previous = self.slots[slot].replace(anchor);
        self.cursor = (self.cursor + 1) % RING_CAPACITY;
        self.total_inserted += 1;
        self.pending_local += 1;
        log::trace!(
            "ring insert slot {} (evicted: {}), cursor -> {}",
            slot,
            previous.is_some(),
            self.cursor
        );
        (slot, previous)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_inserted(&self) -> u64 {
        self.total_inserted
    }

    pub fn applied_store_id(&self) -> u64 {
        self.applied_store_id
    }

    /// Placements made since the last applied snapshot, persisted or not.
    pub fn pending_local(&self) -> u64 {
        self.pending_local
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, slot: usize) -> Option<&H> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Live `(slot, anchor)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &H)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|a| (i, a)))
    }

    /// Live `(slot, anchor)` pairs starting from the oldest occupant.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = (usize, &H)> {
        (0..RING_CAPACITY)
            .map(move |k| (self.cursor + k) % RING_CAPACITY)
            .filter_map(move |i| self.slots[i].as_ref().map(|a| (i, a)))
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(previous) = slot.take() {
                previous.detach();
            }
        }
        self.cursor = 0;
        self.total_inserted = 0;
        self.pending_local = 0;
    }

    /// Rebuilds the ring from a store snapshot.
    ///
    /// Store id `n` is insertion number `n`, so it lands in slot
    /// `(n - 1) % RING_CAPACITY` and the cursor ends at `max_id % RING_CAPACITY`.
    /// A snapshot whose newest id is at or below the last applied one is
    /// ignored. Newer snapshots replace local placements that have not reached
    /// the store yet; those come back with the snapshot that carries them.
    pub fn rebuild_from(&mut self, snapshot: Vec<H>) -> RefreshOutcome {
        let mut with_ids: Vec<(u64, H)> = Vec::with_capacity(snapshot.len());
        for anchor in snapshot {
            match anchor.anchor_id() {
                Some(id) if id >= 1 => with_ids.push((id as u64, anchor)),
                other => log::warn!("ignoring snapshot anchor without store id ({:?})", other),
            }
        }
        let Some(max_id) = with_ids.iter().map(|(id, _)| *id).max() else {
            return RefreshOutcome::Empty;
        };
        if max_id <= self.applied_store_id {
            log::debug!(
                "stale snapshot: newest id {} <= applied {}",
                max_id,
                self.applied_store_id
            );
            return RefreshOutcome::Stale;
        }

        let oldest_kept = max_id.saturating_sub(RING_CAPACITY as u64);
        let mut next: [Option<H>; RING_CAPACITY] = std::array::from_fn(|_| None);
        for (id, anchor) in with_ids {
            if id <= oldest_kept {
                continue;
            }
            let slot = ((id - 1) % RING_CAPACITY as u64) as usize;
            next[slot] = Some(anchor);
        }
        for (old, new) in self.slots.iter_mut().zip(next) {
            if let Some(previous) = std::mem::replace(old, new) {
                previous.detach();
            }
        }
        if self.pending_local > 0 {
            log::trace!("snapshot supersedes {} local placements", self.pending_local);
        }
        self.total_inserted = max_id;
        self.applied_store_id = max_id;
        self.pending_local = 0;
        self.cursor = (max_id % RING_CAPACITY as u64) as usize;
        let live = self.len();
        log::debug!("ring rebuilt from snapshot: {} live, cursor {}", live, self.cursor);
        RefreshOutcome::Applied { live }
    }
}

impl<H: Detach> Default for AnchorRing<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_first_follows_cursor_after_wrap() {
        let mut ring: AnchorRing = AnchorRing::new();
        for i in 0..7 {
            ring.insert(Anchor::new(i as f64, 0.0, 0.0));
        }
        let order: Vec<f64> = ring.iter_oldest_first().map(|(_, a)| a.latitude).collect();
        assert_eq!(order, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
