//! Plain-text rendering of a snapshot, used by the `gh-panel` binary.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::engine::Snapshot;
use crate::engine::pipeline::group_runs;
use crate::types::{PullRequestRef, RunConclusion, RunStatus, WorkflowRunRef};
use crate::util::{expand_emoji, format_relative_time, truncate_label};

/// Widest PR or run label, in display columns.
const LABEL_WIDTH: usize = 58;

const LOADING: &str = "Loading...";
const NONE: &str = "None";

/// Render `snapshot` as menu-like lines, showing only enabled sections.
pub fn render_snapshot(snapshot: &Snapshot, config: &AppConfig) -> Vec<String> {
    let now = Utc::now();
    let mut lines = Vec::new();
    let mut sections = 0;

    if config.show_authored_prs {
        section(&mut lines, &mut sections, "Opened by me");
        pr_lines(&mut lines, snapshot, &snapshot.my_prs);
    }
    if config.show_review_prs {
        section(&mut lines, &mut sections, "Pending review");
        pr_lines(&mut lines, snapshot, &snapshot.review_prs);
    }
    if config.show_actions {
        section(&mut lines, &mut sections, "Actions");
        match snapshot.action_runs {
            Some(ref runs) if snapshot.has_data => run_lines(&mut lines, runs, now),
            _ => lines.push(format!("  {LOADING}")),
        }
    }
    lines
}

fn section(lines: &mut Vec<String>, count: &mut usize, title: &str) {
    if *count > 0 {
        lines.push(String::new());
    }
    *count += 1;
    lines.push(title.to_owned());
}

fn pr_lines(lines: &mut Vec<String>, snapshot: &Snapshot, prs: &[PullRequestRef]) {
    if !snapshot.has_data {
        lines.push(format!("  {LOADING}"));
        return;
    }
    if prs.is_empty() {
        lines.push(format!("  {NONE}"));
        return;
    }
    for pr in prs {
        let label = pr.label();
        let label = expand_emoji(&label);
        lines.push(format!("  {}", truncate_label(&label, LABEL_WIDTH)));
    }
}

fn run_lines(lines: &mut Vec<String>, runs: &[WorkflowRunRef], now: DateTime<Utc>) {
    if runs.is_empty() {
        lines.push(format!("  {NONE}"));
        return;
    }
    for repo in group_runs(runs) {
        lines.push(format!("  {}", repo.repo));
        for workflow in repo.workflows {
            lines.push(format!("    {}", workflow.workflow_name));
            for run in workflow.runs {
                lines.push(format!("      {}", run_line(run, now)));
            }
        }
    }
}

fn run_line(run: &WorkflowRunRef, now: DateTime<Utc>) -> String {
    let title = expand_emoji(&run.display_title);
    let mut line = format!("{} {}", run_glyph(run), truncate_label(&title, LABEL_WIDTH));
    if let Some(progress) = run.progress()
        && progress.total > 0
        && run.status != RunStatus::Completed
    {
        line.push_str(&format!("  {}/{}", progress.done, progress.total));
    }
    line.push_str(&format!("  {}", format_relative_time(&run.created_at, now)));
    line
}

fn run_glyph(run: &WorkflowRunRef) -> &'static str {
    match (run.status, run.conclusion) {
        (RunStatus::Completed, Some(RunConclusion::Success)) => "✓",
        (RunStatus::Completed, Some(c)) if c.is_failure() => "✗",
        (RunStatus::Completed, _) => "–",
        (RunStatus::Queued | RunStatus::Waiting | RunStatus::Requested | RunStatus::Pending, _) => {
            "○"
        }
        _ => "●",
    }
}
