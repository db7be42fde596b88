use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::types::{PullRequestRef, WorkflowRunRef};

/// Everything the presentation layer shows, as of the last committed round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub my_prs: Vec<PullRequestRef>,
    pub review_prs: Vec<PullRequestRef>,
    /// `None` while runs are being fetched; distinct from an empty list.
    pub action_runs: Option<Vec<WorkflowRunRef>>,
    pub has_data: bool,
}

/// Last committed snapshot, shared between the engine and its handles.
///
/// Cheaply cloneable. Only the engine loop writes; handles read a copy
/// synchronously.
#[derive(Clone, Default)]
pub struct SnapshotCache {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_data(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_data
    }

    /// Replace all three sources in one write and return the new snapshot.
    pub(crate) fn commit(
        &self,
        my_prs: Vec<PullRequestRef>,
        review_prs: Vec<PullRequestRef>,
        action_runs: Vec<WorkflowRunRef>,
    ) -> Snapshot {
        let snapshot = Snapshot {
            my_prs,
            review_prs,
            action_runs: Some(action_runs),
            has_data: true,
        };
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        snapshot
    }

    /// Forget that the data is current. The stale data itself is kept.
    pub(crate) fn invalidate(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .has_data = false;
    }

    pub(crate) fn mark_actions_in_flight(&self) -> Snapshot {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.action_runs = None;
        snapshot.clone()
    }
}
