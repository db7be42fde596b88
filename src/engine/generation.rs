use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic round counter. Only the engine loop advances it.
#[derive(Default)]
pub(crate) struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    /// Start a new round, superseding every earlier one.
    pub(crate) fn advance(&self) -> GenerationToken {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationToken {
            id,
            current: Arc::clone(&self.current),
        }
    }

    pub(crate) fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Generation id captured when a round's work was dispatched.
#[derive(Clone)]
pub(crate) struct GenerationToken {
    id: u64,
    current: Arc<AtomicU64>,
}

impl GenerationToken {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer round has started since this token was issued.
    pub(crate) fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }
}
