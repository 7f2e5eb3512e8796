use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use super::AnchorStore;
use crate::anchor::Anchor;
use crate::error::{AnchorError, Result};

/// Runs store inserts on a dedicated thread so placement never blocks the frame loop.
///
/// Subscribe to the store before handing it to the worker; snapshots then
/// arrive on the subscription as each insert lands.
pub struct PersistenceWorker {
    sender: Option<Sender<Anchor>>,
    failures: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn spawn<S: AnchorStore + 'static>(store: S, queue_depth: usize) -> Result<PersistenceWorker> {
        let (sender, receiver) = bounded::<Anchor>(queue_depth.max(1));
        let failures = Arc::new(AtomicUsize::new(0));
        let thread_failures = failures.clone();
        let handle = thread::Builder::new()
            .name("anchor-persistence".to_string())
            .spawn(move || run(store, receiver, thread_failures))?;
        Ok(PersistenceWorker {
            sender: Some(sender),
            failures,
            handle: Some(handle),
        })
    }

    /// Queues `anchor` for insertion without blocking.
    pub fn submit(&self, anchor: Anchor) -> Result<()> {
        let Some(sender) = &self.sender else {
            return Err(AnchorError::PersistenceUnavailable(
                "persistence worker stopped".to_string(),
            ));
        };
        sender.try_send(anchor).map_err(|e| match e {
            TrySendError::Full(_) => {
                AnchorError::PersistenceUnavailable("persistence queue full".to_string())
            }
            TrySendError::Disconnected(_) => {
                AnchorError::PersistenceUnavailable("persistence worker exited".to_string())
            }
        })
    }

    /// Number of inserts the store rejected so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// Drains queued anchors and joins the worker thread.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("persistence worker panicked");
            }
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<S: AnchorStore>(mut store: S, receiver: Receiver<Anchor>, failures: Arc<AtomicUsize>) {
    for anchor in receiver.iter() {
        match store.insert(&anchor) {
            Ok(id) => log::debug!("persisted anchor {}", id),
            Err(e) => {
                failures.fetch_add(1, Ordering::SeqCst);
                log::warn!("failed to persist anchor: {}", e);
            }
        }
    }
    log::trace!("persistence worker exiting");
}
