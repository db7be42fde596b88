use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::gh::{ProcessRunner, commands};

/// Memoized login lookup state.
#[derive(Debug, Default)]
struct UsernameCache {
    login: Option<String>,
    resolved: bool,
    /// Reset epoch the memo was taken in.
    epoch: u64,
}

/// Resolves the authenticated account's login once per engine lifetime.
///
/// Concurrent callers wait on the same lookup. A failed lookup is remembered
/// as "resolved, unknown" until [`UsernameResolver::reset`].
#[derive(Debug, Default)]
pub(crate) struct UsernameResolver {
    state: Mutex<UsernameCache>,
    epoch: AtomicU64,
}

impl UsernameResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn resolve<R: ProcessRunner>(&self, runner: &R, gh_path: &str) -> Option<String> {
        // Held across the lookup so a second caller reuses its result.
        let mut state = self.state.lock().await;
        let epoch = self.epoch.load(Ordering::SeqCst);
        if state.resolved && state.epoch == epoch {
            return state.login.clone();
        }

        let output = runner.invoke(gh_path, &commands::viewer_login()).await;
        let login = match output.stdout() {
            Ok(stdout) => Some(stdout.trim().to_owned()).filter(|l| !l.is_empty()),
            Err(e) => {
                tracing::warn!("username: lookup failed: {e}");
                None
            }
        };
        tracing::debug!("username: resolved to {login:?}");

        state.login.clone_from(&login);
        state.resolved = true;
        state.epoch = epoch;
        login
    }

    /// Forget the memoized login.
    ///
    /// Does not wait for a lookup in progress; whatever it stores is already
    /// out of date and the next caller looks up again.
    pub(crate) fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}
