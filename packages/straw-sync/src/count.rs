//! Shared unanswered-count handle.
//!
//! One count exists per page lifetime. Every mounted fragment holds a
//! clone of the same handle, so they all observe the same value; the
//! handle is passed in explicitly at mount time, never reached for as a
//! global. Only the question store's `load()` and answer reconciliation
//! write it; everything else subscribes read-only.

use std::sync::Arc;

use tokio::sync::watch;

/// Observable unanswered-question count, shared by cloning.
///
/// Clones share the underlying channel, so a write through any handle is
/// visible to every subscriber.
#[derive(Clone)]
pub struct SharedCount {
    tx: Arc<watch::Sender<u32>>,
}

impl SharedCount {
    pub fn new(initial: u32) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value. Side-effect free.
    pub fn get(&self) -> u32 {
        *self.tx.borrow()
    }

    /// Subscribe to value changes.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }

    /// Write the count. Restricted to the store and the answer
    /// controller; fragments only read.
    pub(crate) fn set(&self, value: u32) {
        self.tx.send_replace(value);
    }
}

impl Default for SharedCount {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for SharedCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCount")
            .field("value", &self.get())
            .finish()
    }
}
