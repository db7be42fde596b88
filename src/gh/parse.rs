//! Decoding of `gh --json` output into domain types.
//!
//! Empty (or whitespace-only) output is treated as an empty list; anything
//! else that is not the expected JSON shape is a [`GhError::Malformed`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::GhError;
use crate::types::{PullRequestRef, RunConclusion, RunStatus, StepProgress, WorkflowRunRef};

// ---------------------------------------------------------------------------
// Raw output types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    repository: Option<RawRepository>,
    #[serde(default)]
    head_repository: Option<RawRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRepository {
    #[serde(default)]
    name_with_owner: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRun {
    database_id: u64,
    #[serde(default)]
    workflow_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    conclusion: String,
    #[serde(default)]
    display_title: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct RawRunView {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

#[derive(Deserialize)]
struct RawJob {
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Deserialize)]
struct RawStep {
    #[serde(default)]
    status: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn is_blank(stdout: &str) -> bool {
    stdout.trim().is_empty()
}

/// Parse a `gh search prs` / `gh pr list` JSON array.
pub fn pull_requests(stdout: &str) -> Result<Vec<PullRequestRef>, GhError> {
    if is_blank(stdout) {
        return Ok(Vec::new());
    }
    let raw: Vec<RawPullRequest> = serde_json::from_str(stdout.trim())?;
    Ok(raw
        .into_iter()
        .map(|pr| {
            let repository_name = pr
                .repository
                .and_then(|r| r.name_with_owner)
                .or_else(|| pr.head_repository.and_then(|r| r.name_with_owner))
                .unwrap_or_default();
            PullRequestRef {
                repository_name,
                number: pr.number,
                title: pr.title,
                url: pr.url,
            }
        })
        .collect())
}

/// Parse a `gh run list` JSON array, tagging every run with `repo`.
pub fn workflow_runs(
    stdout: &str,
    repo: &str,
    actor: Option<&str>,
) -> Result<Vec<WorkflowRunRef>, GhError> {
    if is_blank(stdout) {
        return Ok(Vec::new());
    }
    let raw: Vec<RawRun> = serde_json::from_str(stdout.trim())?;
    Ok(raw
        .into_iter()
        .map(|run| WorkflowRunRef {
            repo: repo.to_owned(),
            run_id: run.database_id.to_string(),
            workflow_name: run.workflow_name,
            status: RunStatus::parse(&run.status),
            conclusion: RunConclusion::parse(&run.conclusion),
            display_title: run.display_title,
            created_at: run.created_at,
            url: run.url,
            actor: actor.map(str::to_owned),
            steps_total: None,
            steps_done: None,
        })
        .collect())
}

/// Count steps across all jobs of a `gh run view --json jobs` object.
pub fn step_progress(stdout: &str) -> Result<StepProgress, GhError> {
    let view: RawRunView = serde_json::from_str(stdout.trim())?;
    let steps = view.jobs.iter().flat_map(|j| &j.steps);
    let (total, done) = steps.fold((0u32, 0u32), |(total, done), step| {
        let finished = RunStatus::parse(&step.status) == RunStatus::Completed;
        (total + 1, done + u32::from(finished))
    });
    Ok(StepProgress::new(total, done))
}
