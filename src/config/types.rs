use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

/// Platform-standard location of the `gh` binary.
pub const DEFAULT_GH_PATH: &str = "/usr/bin/gh";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every option the panel recognises. All of them may change between rounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gh_path: String,
    pub show_authored_prs: bool,
    pub show_review_prs: bool,
    pub show_actions: bool,
    /// Upper bound on items fetched per PR source and per repository.
    pub result_limit: u32,
    /// Popup width; only the presentation layer reads it.
    pub menu_width_px: u32,
    pub actions_hours_window: u32,
    /// Comma-separated `owner/name` list.
    pub actions_repos: String,
    pub actions_only_mine: bool,
    /// How many runs survive filtering and get per-run detail.
    pub actions_max_runs: u32,
    /// JSON object `{ "owner/name": { "Workflow": bool } }`.
    pub actions_workflow_visibility: String,
    /// Background refresh period; `0` disables scheduled rounds.
    pub refresh_interval_minutes: u32,
    pub gh_timeout_secs: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gh_path: DEFAULT_GH_PATH.to_owned(),
            show_authored_prs: true,
            show_review_prs: true,
            show_actions: false,
            result_limit: 20,
            menu_width_px: 400,
            actions_hours_window: 24,
            actions_repos: String::new(),
            actions_only_mine: false,
            actions_max_runs: 10,
            actions_workflow_visibility: "{}".to_owned(),
            refresh_interval_minutes: 5,
            gh_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// The `gh` path with surrounding whitespace removed, or the default when blank.
    pub fn gh_binary(&self) -> &str {
        let path = self.gh_path.trim();
        if path.is_empty() { DEFAULT_GH_PATH } else { path }
    }

    pub fn result_limit(&self) -> u32 {
        self.result_limit.clamp(1, 100)
    }

    pub fn gh_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.gh_timeout_secs.max(1)))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_minutes > 0)
            .then(|| Duration::from_secs(u64::from(self.refresh_interval_minutes) * 60))
    }

    /// Configured repositories, trimmed, without blanks or repeats.
    pub fn repos(&self) -> Vec<String> {
        let mut repos: Vec<String> = Vec::new();
        for repo in self.actions_repos.split(',').map(str::trim) {
            if !repo.is_empty() && !repos.iter().any(|r| r == repo) {
                repos.push(repo.to_owned());
            }
        }
        repos
    }

    pub fn workflow_visibility(&self) -> WorkflowVisibility {
        WorkflowVisibility::parse(&self.actions_workflow_visibility)
    }

    /// Flip one workflow between shown and hidden. Returns the new state.
    pub fn toggle_workflow(&mut self, repo: &str, workflow: &str) -> bool {
        let mut visibility = self.workflow_visibility();
        let visible = !visibility.is_visible(repo, workflow);
        visibility.set(repo, workflow, visible);
        self.actions_workflow_visibility = visibility.to_json();
        visible
    }
}

// ---------------------------------------------------------------------------
// Workflow visibility
// ---------------------------------------------------------------------------

/// Per-repository, per-workflow show/hide switches.
///
/// Anything not mentioned is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WorkflowVisibility(HashMap<String, HashMap<String, bool>>);

impl WorkflowVisibility {
    /// Decode the JSON-encoded setting. Malformed input hides nothing.
    pub fn parse(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(json).unwrap_or_else(|e| {
            tracing::warn!("config: ignoring malformed actions_workflow_visibility: {e}");
            Self::default()
        })
    }

    pub fn is_visible(&self, repo: &str, workflow: &str) -> bool {
        self.0
            .get(repo)
            .and_then(|workflows| workflows.get(workflow))
            .copied()
            .unwrap_or(true)
    }

    pub fn set(&mut self, repo: &str, workflow: &str, visible: bool) {
        self.0
            .entry(repo.to_owned())
            .or_default()
            .insert(workflow.to_owned(), visible);
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_owned())
    }
}
