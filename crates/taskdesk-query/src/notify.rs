//! Change notification.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared version counter published on a `watch` channel.
///
/// The value carries no meaning beyond "something changed"; receivers
/// re-read whatever state they display.
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    /// Notifier at version 0.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Bump the version and wake receivers.
    pub fn notify(&self) {
        self.tx.send_modify(|version| *version = version.wrapping_add(1));
    }

    /// New receiver. The current version counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        *self.tx.borrow()
    }
}
