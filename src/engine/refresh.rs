use std::time::{Duration, SystemTime};

/// Decides when a background round is due.
#[derive(Default)]
pub(crate) struct RefreshSchedule {
    // Wall clock: Instant (CLOCK_MONOTONIC) stops during suspend, so a
    // refresh would be missed after wake.
    last_commit: Option<SystemTime>,
}

impl RefreshSchedule {
    pub(crate) fn mark_committed(&mut self) {
        self.last_commit = Some(SystemTime::now());
    }

    /// Whether `interval` has elapsed since the last commit.
    ///
    /// Nothing is due before the first commit. The initial load happens on
    /// open; background refresh fires only afterwards.
    pub(crate) fn is_due(&self, interval: Duration) -> bool {
        let now = SystemTime::now();
        self.last_commit
            .is_some_and(|t| now.duration_since(t).unwrap_or(Duration::ZERO) >= interval)
    }
}
