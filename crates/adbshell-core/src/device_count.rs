// ── Shared device count ──
//
// A single watch cell holding the number of connected devices. The
// periodic probe overwrites it with the exact value; connect/disconnect
// handlers nudge it between probes. All writes saturate at zero.

use std::sync::Arc;

use tokio::sync::watch;

/// How a successful command moves the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountChange {
    Connected,
    Disconnected,
    DisconnectedAll,
}

/// Cheaply cloneable handle to the shared count.
#[derive(Debug, Clone)]
pub struct DeviceCount {
    tx: Arc<watch::Sender<usize>>,
}

impl Default for DeviceCount {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCount {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> usize {
        *self.tx.borrow()
    }

    /// Apply an inline adjustment and return the new value.
    pub fn apply(&self, change: CountChange) -> usize {
        self.tx.send_modify(|count| {
            *count = match change {
                CountChange::Connected => count.saturating_add(1),
                CountChange::Disconnected => count.saturating_sub(1),
                CountChange::DisconnectedAll => 0,
            };
        });
        self.get()
    }

    /// Replace the value with a probed count. Always notifies subscribers.
    pub fn set_probed(&self, count: usize) {
        self.tx.send_replace(count);
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}
