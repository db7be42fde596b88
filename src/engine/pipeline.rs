//! Pure transformations over workflow-run lists.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::WorkflowVisibility;
use crate::types::WorkflowRunRef;

/// Parameters of [`select_runs`].
pub struct RunSelection<'a> {
    pub now: DateTime<Utc>,
    pub hours_window: u32,
    pub max_runs: usize,
    pub visibility: &'a WorkflowVisibility,
}

/// Keep recent, visible runs, most recent first, at most `max_runs`.
///
/// Truncation happens last so the survivors are the newest runs, not an
/// arbitrary subset.
pub fn select_runs(mut runs: Vec<WorkflowRunRef>, sel: &RunSelection<'_>) -> Vec<WorkflowRunRef> {
    // A window reaching past the representable range keeps everything.
    let cutoff = Duration::try_hours(i64::from(sel.hours_window))
        .and_then(|window| sel.now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    runs.retain(|run| {
        run.created_at >= cutoff && sel.visibility.is_visible(&run.repo, &run.workflow_name)
    });
    // Stable sort: equal timestamps keep their accumulation order.
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    runs.truncate(sel.max_runs);
    runs
}

/// Runs of one workflow, in the order they were received.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowGroup<'a> {
    pub workflow_name: &'a str,
    pub runs: Vec<&'a WorkflowRunRef>,
}

/// Workflows of one repository, alphabetical.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoGroup<'a> {
    pub repo: &'a str,
    pub workflows: Vec<WorkflowGroup<'a>>,
}

/// Group runs by repository, then workflow, both in name order.
///
/// Runs inside each workflow keep their input order.
pub fn group_runs(runs: &[WorkflowRunRef]) -> Vec<RepoGroup<'_>> {
    let mut repos: BTreeMap<&str, BTreeMap<&str, Vec<&WorkflowRunRef>>> = BTreeMap::new();
    for run in runs {
        repos
            .entry(run.repo.as_str())
            .or_default()
            .entry(run.workflow_name.as_str())
            .or_default()
            .push(run);
    }
    repos
        .into_iter()
        .map(|(repo, workflows)| RepoGroup {
            repo,
            workflows: workflows
                .into_iter()
                .map(|(workflow_name, runs)| WorkflowGroup {
                    workflow_name,
                    runs,
                })
                .collect(),
        })
        .collect()
}
