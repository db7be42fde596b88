use std::sync::mpsc::Sender;

use super::cache::{Snapshot, SnapshotCache};

/// Handle to the backend engine held by the presentation layer.
///
/// Cheaply cloneable. When the last handle is dropped the sender channel
/// closes, signalling the engine to shut down.
#[derive(Clone)]
pub struct EngineHandle {
    tx: tokio::sync::mpsc::UnboundedSender<Request>,
    cache: SnapshotCache,
}

impl EngineHandle {
    pub(super) fn new(tx: tokio::sync::mpsc::UnboundedSender<Request>, cache: SnapshotCache) -> Self {
        Self { tx, cache }
    }

    /// Send a request to the engine. Non-blocking, returns immediately.
    pub fn send(&self, req: Request) {
        // Ignore errors: if the receiver is gone the engine has already shut down.
        let _ = self.tx.send(req);
    }

    /// The last committed snapshot, read synchronously.
    pub fn snapshot(&self) -> Snapshot {
        self.cache.current()
    }
}

/// Trait implemented by every engine flavour.
pub trait Engine: Send + 'static {
    fn start(self) -> EngineHandle;
}

/// All operations the presentation layer can send to the engine.
pub enum Request {
    /// The panel became visible: serve the cache, then start a full round.
    Open { notify_tx: Sender<Event> },
    /// The panel was hidden; commits keep landing in the cache silently.
    Close,
    /// Forget the cached data and start a full round.
    Refresh,
    /// Re-fetch workflow runs only, keeping pull request data.
    RefreshActions,
    /// Drop the memoized login so the next "only mine" round looks it up again.
    ResetUsername,
    Shutdown,
}

/// All events the engine can push back to the presentation layer.
#[derive(Debug)]
pub enum Event {
    SnapshotUpdated { snapshot: Snapshot },
}
