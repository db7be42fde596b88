use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Settings;
use crate::gh::ProcessRunner;

use super::cache::SnapshotCache;
use super::interface::{Engine, EngineHandle, Request};
use super::orchestrator::Orchestrator;

/// How often the loop checks whether a background round is due.
const REFRESH_TICK: Duration = Duration::from_secs(30);

/// The panel backend engine.
pub struct PanelEngine<R: ProcessRunner> {
    settings: Settings,
    runner: Arc<R>,
}

impl<R: ProcessRunner> PanelEngine<R> {
    pub fn new(settings: Settings, runner: R) -> Self {
        Self::with_shared_runner(settings, Arc::new(runner))
    }

    /// Build an engine around a runner the caller keeps a handle to.
    pub fn with_shared_runner(settings: Settings, runner: Arc<R>) -> Self {
        Self { settings, runner }
    }
}

impl<R: ProcessRunner> Engine for PanelEngine<R> {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        let cache = SnapshotCache::new();
        let handle = EngineHandle::new(tx, cache.clone());
        let _ = std::thread::Builder::new()
            .name("gh-panel-engine".to_owned())
            .spawn(move || {
                // One control thread: requests, source results and ticks are
                // all handled by `run_loop`.
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("tokio runtime init");
                rt.block_on(self.run_loop(rx, cache));
            });
        handle
    }
}

impl<R: ProcessRunner> PanelEngine<R> {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>, cache: SnapshotCache) {
        let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut orchestrator = Orchestrator::new(self.settings, self.runner, cache, done_tx);

        let mut refresh_tick = tokio::time::interval(REFRESH_TICK);
        // Consume the first immediate tick so refresh fires after one full interval.
        refresh_tick.tick().await;

        loop {
            tokio::select! {
                biased;
                maybe_req = rx.recv() => {
                    match maybe_req {
                        None | Some(Request::Shutdown) => {
                            tracing::debug!("engine: shutting down");
                            break;
                        }
                        Some(req) => handle_request(req, &mut orchestrator),
                    }
                }
                Some(resolution) = done_rx.recv() => {
                    orchestrator.on_resolved(resolution);
                }
                _ = refresh_tick.tick() => {
                    orchestrator.tick();
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Request dispatch
// ---------------------------------------------------------------------------

fn handle_request<R: ProcessRunner>(req: Request, orchestrator: &mut Orchestrator<R>) {
    match req {
        Request::Open { notify_tx } => {
            tracing::debug!("engine: open");
            orchestrator.open(notify_tx);
        }
        Request::Close => {
            tracing::debug!("engine: close");
            orchestrator.close();
        }
        Request::Refresh => {
            tracing::debug!("engine: manual refresh");
            orchestrator.refresh();
        }
        Request::RefreshActions => {
            tracing::debug!("engine: actions refresh");
            orchestrator.refresh_actions();
        }
        Request::ResetUsername => {
            tracing::debug!("engine: reset username");
            orchestrator.reset_username();
        }
        // Handled by the loop.
        Request::Shutdown => {}
    }
}
