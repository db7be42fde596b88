use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WorkflowRun-specific enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "waiting" => Self::Waiting,
            "requested" => Self::Requested,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }
}

/// Outcome of a completed run. Runs that have not concluded carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    TimedOut,
    StartupFailure,
    #[serde(other)]
    Other,
}

impl RunConclusion {
    /// `gh` reports an empty string for runs that have not concluded yet.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => None,
            "success" => Some(Self::Success),
            "failure" => Some(Self::Failure),
            "timed_out" => Some(Self::TimedOut),
            "startup_failure" => Some(Self::StartupFailure),
            _ => Some(Self::Other),
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failure | Self::TimedOut | Self::StartupFailure)
    }
}

// ---------------------------------------------------------------------------
// Step progress (second-pass detail)
// ---------------------------------------------------------------------------

/// Completed-step counts across all jobs of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub total: u32,
    pub done: u32,
}

impl StepProgress {
    /// Build a progress record, clamping `done` so it never exceeds `total`.
    pub fn new(total: u32, done: u32) -> Self {
        Self {
            total,
            done: done.min(total),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowRun domain type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunRef {
    /// `owner/name` of the repository the run was listed from.
    pub repo: String,
    pub run_id: String,
    pub workflow_name: String,
    pub status: RunStatus,
    pub conclusion: Option<RunConclusion>,
    /// Commit message head / trigger title shown in the GitHub UI.
    pub display_title: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
    /// Login the run list was scoped to, when "only mine" resolved one.
    pub actor: Option<String>,
    pub steps_total: Option<u32>,
    pub steps_done: Option<u32>,
}

impl WorkflowRunRef {
    pub fn apply_progress(&mut self, progress: StepProgress) {
        self.steps_total = Some(progress.total);
        self.steps_done = Some(progress.done);
    }

    pub fn progress(&self) -> Option<StepProgress> {
        match (self.steps_total, self.steps_done) {
            (Some(total), Some(done)) => Some(StepProgress::new(total, done)),
            _ => None,
        }
    }
}
