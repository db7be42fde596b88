use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;

use crate::config::{AppConfig, WorkflowVisibility};
use crate::gh::{ProcessRunner, commands, parse};
use crate::types::{PullRequestRef, StepProgress, WorkflowRunRef};

use super::generation::GenerationToken;
use super::pipeline::{RunSelection, select_runs};
use super::username::UsernameResolver;

// ---------------------------------------------------------------------------
// Pull request sources
// ---------------------------------------------------------------------------

pub(crate) async fn fetch_authored_prs<R: ProcessRunner>(
    runner: &R,
    gh_path: &str,
    limit: u32,
) -> Vec<PullRequestRef> {
    fetch_prs(runner, gh_path, &commands::authored_prs(limit), "authored PRs").await
}

pub(crate) async fn fetch_review_prs<R: ProcessRunner>(
    runner: &R,
    gh_path: &str,
    limit: u32,
) -> Vec<PullRequestRef> {
    fetch_prs(
        runner,
        gh_path,
        &commands::review_requested_prs(limit),
        "review PRs",
    )
    .await
}

async fn fetch_prs<R: ProcessRunner>(
    runner: &R,
    gh_path: &str,
    args: &[String],
    source: &str,
) -> Vec<PullRequestRef> {
    let output = runner.invoke(gh_path, args).await;
    match output.stdout().and_then(parse::pull_requests) {
        Ok(prs) => {
            tracing::debug!("fetch: {source} count={}", prs.len());
            prs
        }
        Err(e) => {
            tracing::warn!("fetch: {source} unavailable: {e}");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow-run source
// ---------------------------------------------------------------------------

/// Round-start copy of every setting the workflow-run source reads.
#[derive(Debug, Clone)]
pub(crate) struct ActionsQuery {
    pub gh_path: String,
    pub repos: Vec<String>,
    pub per_repo_limit: u32,
    pub only_mine: bool,
    pub hours_window: u32,
    pub max_runs: usize,
    pub visibility: WorkflowVisibility,
}

impl ActionsQuery {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self {
            gh_path: config.gh_binary().to_owned(),
            repos: config.repos(),
            per_repo_limit: config.result_limit(),
            only_mine: config.actions_only_mine,
            hours_window: config.actions_hours_window,
            max_runs: usize::try_from(config.actions_max_runs).unwrap_or(usize::MAX),
            visibility: config.workflow_visibility(),
        }
    }
}

/// Fetch, select and enrich workflow runs across all configured repositories.
///
/// Returns `None` when `token` was superseded before the work finished; the
/// per-run detail fan-out is skipped in that case.
pub(crate) async fn fetch_workflow_runs<R: ProcessRunner>(
    runner: Arc<R>,
    username: &UsernameResolver,
    query: ActionsQuery,
    token: &GenerationToken,
) -> Option<Vec<WorkflowRunRef>> {
    if query.repos.is_empty() {
        return Some(Vec::new());
    }

    // The actor filter is part of the query, so it must be known first.
    let actor = if query.only_mine {
        username.resolve(runner.as_ref(), &query.gh_path).await
    } else {
        None
    };
    if !token.is_current() {
        return None;
    }

    let accumulated = fetch_repo_runs(&runner, &query, actor).await;
    if !token.is_current() {
        tracing::debug!("fetch: round {} superseded before run detail", token.id());
        return None;
    }

    let selection = RunSelection {
        now: Utc::now(),
        hours_window: query.hours_window,
        max_runs: query.max_runs,
        visibility: &query.visibility,
    };
    let mut runs = select_runs(accumulated, &selection);
    tracing::debug!("fetch: {} runs selected for detail", runs.len());

    if !runs.is_empty() {
        fetch_run_details(&runner, &query.gh_path, &mut runs).await;
    }
    Some(runs)
}

/// One `run list` per repository, in parallel; failed repositories contribute nothing.
async fn fetch_repo_runs<R: ProcessRunner>(
    runner: &Arc<R>,
    query: &ActionsQuery,
    actor: Option<String>,
) -> Vec<WorkflowRunRef> {
    let mut pending = JoinSet::new();
    for repo in &query.repos {
        let runner = Arc::clone(runner);
        let gh_path = query.gh_path.clone();
        let repo = repo.clone();
        let actor = actor.clone();
        let limit = query.per_repo_limit;
        pending.spawn(async move {
            let args = commands::workflow_runs(&repo, limit, actor.as_deref());
            let output = runner.invoke(&gh_path, &args).await;
            match output
                .stdout()
                .and_then(|stdout| parse::workflow_runs(stdout, &repo, actor.as_deref()))
            {
                Ok(runs) => runs,
                Err(e) => {
                    tracing::warn!("fetch: runs for {repo} unavailable: {e}");
                    Vec::new()
                }
            }
        });
    }

    let mut accumulated = Vec::new();
    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok(runs) => accumulated.extend(runs),
            Err(e) => tracing::warn!("fetch: run list task failed: {e}"),
        }
    }
    accumulated
}

// ---------------------------------------------------------------------------
// Run detail
// ---------------------------------------------------------------------------

/// One `run view` per run, in parallel; fills step counts in place.
///
/// A run whose detail cannot be read gets `0/0`.
async fn fetch_run_details<R: ProcessRunner>(
    runner: &Arc<R>,
    gh_path: &str,
    runs: &mut [WorkflowRunRef],
) {
    let mut pending = JoinSet::new();
    for (idx, run) in runs.iter().enumerate() {
        let runner = Arc::clone(runner);
        let gh_path = gh_path.to_owned();
        let args = commands::run_jobs(&run.repo, &run.run_id);
        pending.spawn(async move {
            let output = runner.invoke(&gh_path, &args).await;
            let progress = output
                .stdout()
                .and_then(parse::step_progress)
                .unwrap_or_else(|e| {
                    tracing::debug!("fetch: run detail unavailable: {e}");
                    StepProgress::default()
                });
            (idx, progress)
        });
    }

    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok((idx, progress)) => {
                if let Some(run) = runs.get_mut(idx) {
                    run.apply_progress(progress);
                }
            }
            Err(e) => tracing::warn!("fetch: run detail task failed: {e}"),
        }
    }

    // Runs whose task died still get the documented default.
    for run in runs.iter_mut().filter(|r| r.steps_total.is_none()) {
        run.apply_progress(StepProgress::default());
    }
}
