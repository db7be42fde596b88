use std::future::Future;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use tokio::sync::mpsc::UnboundedSender;

use crate::config::Settings;
use crate::gh::ProcessRunner;
use crate::types::{PullRequestRef, WorkflowRunRef};

use super::cache::{Snapshot, SnapshotCache};
use super::fetchers::{ActionsQuery, fetch_authored_prs, fetch_review_prs, fetch_workflow_runs};
use super::generation::Generation;
use super::interface::Event;
use super::refresh::RefreshSchedule;
use super::username::UsernameResolver;

/// Output of one top-level source.
pub(crate) enum SourceResult {
    MyPrs(Vec<PullRequestRef>),
    ReviewPrs(Vec<PullRequestRef>),
    ActionRuns(Vec<WorkflowRunRef>),
}

impl SourceResult {
    fn name(&self) -> &'static str {
        match self {
            Self::MyPrs(_) => "authored PRs",
            Self::ReviewPrs(_) => "review PRs",
            Self::ActionRuns(_) => "workflow runs",
        }
    }
}

/// A source result tagged with the round that dispatched it.
pub(crate) struct Resolution {
    pub generation: u64,
    pub source: SourceResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RoundScope {
    Full,
    /// Re-fetch workflow runs only; PR slots come from the cache.
    ActionsOnly,
}

/// Join state of the active round: `None` = pending.
struct RoundJoin {
    generation: u64,
    my_prs: Option<Vec<PullRequestRef>>,
    review_prs: Option<Vec<PullRequestRef>>,
    action_runs: Option<Vec<WorkflowRunRef>>,
}

impl RoundJoin {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            my_prs: None,
            review_prs: None,
            action_runs: None,
        }
    }

    fn fill(&mut self, source: SourceResult) {
        match source {
            SourceResult::MyPrs(prs) => self.my_prs = Some(prs),
            SourceResult::ReviewPrs(prs) => self.review_prs = Some(prs),
            SourceResult::ActionRuns(runs) => self.action_runs = Some(runs),
        }
    }

    fn is_complete(&self) -> bool {
        self.my_prs.is_some() && self.review_prs.is_some() && self.action_runs.is_some()
    }
}

/// Where commits are announced while the panel is visible.
#[derive(Default)]
struct Presenter {
    visible: bool,
    notify_tx: Option<Sender<Event>>,
}

impl Presenter {
    fn notify(&mut self, snapshot: Snapshot) {
        if !self.visible {
            return;
        }
        let Some(ref tx) = self.notify_tx else {
            return;
        };
        if tx.send(Event::SnapshotUpdated { snapshot }).is_err() {
            tracing::debug!("engine: presentation layer gone, closing");
            self.visible = false;
            self.notify_tx = None;
        }
    }
}

/// Coordinates rounds: owns the generation counter and the join state, and
/// is the only writer of the snapshot cache.
///
/// Every method runs on the engine loop; spawned source tasks only report
/// back through `done_tx`.
pub(crate) struct Orchestrator<R: ProcessRunner> {
    settings: Settings,
    runner: Arc<R>,
    username: Arc<UsernameResolver>,
    generation: Generation,
    join: Option<RoundJoin>,
    cache: SnapshotCache,
    presenter: Presenter,
    schedule: RefreshSchedule,
    done_tx: UnboundedSender<Resolution>,
}

impl<R: ProcessRunner> Orchestrator<R> {
    pub(crate) fn new(
        settings: Settings,
        runner: Arc<R>,
        cache: SnapshotCache,
        done_tx: UnboundedSender<Resolution>,
    ) -> Self {
        Self {
            settings,
            runner,
            username: Arc::new(UsernameResolver::new()),
            generation: Generation::default(),
            join: None,
            cache,
            presenter: Presenter::default(),
            schedule: RefreshSchedule::default(),
            done_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Presentation-layer requests
    // -----------------------------------------------------------------------

    pub(crate) fn open(&mut self, notify_tx: Sender<Event>) {
        self.presenter.visible = true;
        self.presenter.notify_tx = Some(notify_tx);
        if self.cache.has_data() {
            self.presenter.notify(self.cache.current());
        }
        self.start_round(RoundScope::Full);
    }

    pub(crate) fn close(&mut self) {
        self.presenter.visible = false;
    }

    pub(crate) fn refresh(&mut self) {
        self.cache.invalidate();
        self.start_round(RoundScope::Full);
    }

    pub(crate) fn refresh_actions(&mut self) {
        self.start_round(RoundScope::ActionsOnly);
    }

    pub(crate) fn reset_username(&self) {
        self.username.reset();
    }

    /// Background refresh check, driven by the engine's ticker.
    pub(crate) fn tick(&mut self) {
        let Some(interval) = self.settings.current().refresh_interval() else {
            return;
        };
        if self.join.is_none() && self.schedule.is_due(interval) {
            tracing::debug!("engine: scheduled refresh");
            self.start_round(RoundScope::Full);
        }
    }

    // -----------------------------------------------------------------------
    // Rounds
    // -----------------------------------------------------------------------

    /// Begin a new round, superseding whatever round is still pending.
    pub(crate) fn start_round(&mut self, scope: RoundScope) {
        // A partial refresh cannot reuse PR data that is missing or still
        // in flight.
        let scope = if scope == RoundScope::ActionsOnly
            && (self.join.is_some() || !self.cache.has_data())
        {
            RoundScope::Full
        } else {
            scope
        };

        let config = self.settings.current();
        let token = self.generation.advance();
        let generation = token.id();
        let mut join = RoundJoin::new(generation);
        tracing::debug!("engine: round {generation} started ({scope:?})");

        let gh_path = config.gh_binary().to_owned();
        let limit = config.result_limit();

        if !config.show_authored_prs {
            join.my_prs = Some(Vec::new());
        } else if scope == RoundScope::ActionsOnly {
            join.my_prs = Some(self.cache.current().my_prs);
        } else {
            let runner = Arc::clone(&self.runner);
            let gh_path = gh_path.clone();
            self.dispatch(generation, SourceResult::MyPrs(Vec::new()), async move {
                let prs = fetch_authored_prs(runner.as_ref(), &gh_path, limit).await;
                Some(SourceResult::MyPrs(prs))
            });
        }

        if !config.show_review_prs {
            join.review_prs = Some(Vec::new());
        } else if scope == RoundScope::ActionsOnly {
            join.review_prs = Some(self.cache.current().review_prs);
        } else {
            let runner = Arc::clone(&self.runner);
            let gh_path = gh_path.clone();
            self.dispatch(generation, SourceResult::ReviewPrs(Vec::new()), async move {
                let prs = fetch_review_prs(runner.as_ref(), &gh_path, limit).await;
                Some(SourceResult::ReviewPrs(prs))
            });
        }

        if config.show_actions {
            if scope == RoundScope::ActionsOnly {
                let snapshot = self.cache.mark_actions_in_flight();
                self.presenter.notify(snapshot);
            }
            let runner = Arc::clone(&self.runner);
            let username = Arc::clone(&self.username);
            let query = ActionsQuery::from_config(&config);
            self.dispatch(generation, SourceResult::ActionRuns(Vec::new()), async move {
                fetch_workflow_runs(runner, &username, query, &token)
                    .await
                    .map(SourceResult::ActionRuns)
            });
        } else {
            join.action_runs = Some(Vec::new());
        }

        self.join = Some(join);
        // Everything may already be resolved (all sources disabled).
        self.try_commit();
    }

    /// Run `work` on the runtime and report its result back to the loop.
    ///
    /// A task that dies reports `fallback` instead, so its slot is still
    /// filled and the round can commit.
    fn dispatch<F>(&self, generation: u64, fallback: SourceResult, work: F)
    where
        F: Future<Output = Option<SourceResult>> + Send + 'static,
    {
        let done_tx = self.done_tx.clone();
        let work = tokio::spawn(work);
        tokio::spawn(async move {
            let source = match work.await {
                Ok(Some(source)) => source,
                // Superseded before finishing.
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!("engine: {} task failed: {e}", fallback.name());
                    fallback
                }
            };
            let _ = done_tx.send(Resolution { generation, source });
        });
    }

    /// Record one source's result, committing when the round is complete.
    pub(crate) fn on_resolved(&mut self, resolution: Resolution) {
        let Resolution { generation, source } = resolution;
        if generation != self.generation.current() {
            tracing::debug!(
                "engine: dropping {} from superseded round {generation}",
                source.name()
            );
            return;
        }
        let Some(join) = self.join.as_mut().filter(|j| j.generation == generation) else {
            return;
        };
        tracing::debug!("engine: round {generation} resolved {}", source.name());
        join.fill(source);
        self.try_commit();
    }

    fn try_commit(&mut self) {
        if !self.join.as_ref().is_some_and(RoundJoin::is_complete) {
            return;
        }
        let Some(RoundJoin {
            generation,
            my_prs: Some(my_prs),
            review_prs: Some(review_prs),
            action_runs: Some(action_runs),
        }) = self.join.take()
        else {
            return;
        };

        tracing::debug!(
            "engine: round {generation} committed my={} review={} runs={}",
            my_prs.len(),
            review_prs.len(),
            action_runs.len()
        );
        let snapshot = self.cache.commit(my_prs, review_prs, action_runs);
        self.schedule.mark_committed();
        self.presenter.notify(snapshot);
    }
}
