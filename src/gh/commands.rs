//! Argument templates for every `gh` invocation the engine issues.

const PR_FIELDS: &str = "number,title,url,repository";
const RUN_FIELDS: &str = "databaseId,workflowName,status,conclusion,displayTitle,createdAt,url";

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|&a| a.to_owned()).collect()
}

/// Open PRs authored by the authenticated user, across all repositories.
pub fn authored_prs(limit: u32) -> Vec<String> {
    let mut args = owned(&["search", "prs", "--author=@me", "--state=open", "--json", PR_FIELDS]);
    args.extend(["--limit".to_owned(), limit.to_string()]);
    args
}

/// Open PRs where the authenticated user's review is requested.
pub fn review_requested_prs(limit: u32) -> Vec<String> {
    let mut args = owned(&[
        "search",
        "prs",
        "--review-requested=@me",
        "--state=open",
        "--json",
        PR_FIELDS,
    ]);
    args.extend(["--limit".to_owned(), limit.to_string()]);
    args
}

/// Recent workflow runs of one repository, optionally scoped to `actor`.
pub fn workflow_runs(repo: &str, limit: u32, actor: Option<&str>) -> Vec<String> {
    let mut args = owned(&["run", "list", "--repo"]);
    args.push(repo.to_owned());
    args.extend(["--limit".to_owned(), limit.to_string()]);
    args.extend(["--json".to_owned(), RUN_FIELDS.to_owned()]);
    if let Some(login) = actor {
        args.extend(["--user".to_owned(), login.to_owned()]);
    }
    args
}

/// Job and step detail of one run.
pub fn run_jobs(repo: &str, run_id: &str) -> Vec<String> {
    let mut args = owned(&["run", "view"]);
    args.push(run_id.to_owned());
    args.extend(["--repo".to_owned(), repo.to_owned()]);
    args.extend(["--json".to_owned(), "jobs".to_owned()]);
    args
}

/// Login of the authenticated account.
pub fn viewer_login() -> Vec<String> {
    owned(&["api", "user", "--jq", ".login"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_list_without_actor_has_no_user_flag() {
        let args = workflow_runs("acme/web", 20, None);
        assert!(!args.iter().any(|a| a == "--user"));
        assert_eq!(&args[..4], ["run", "list", "--repo", "acme/web"]);
    }

    #[test]
    fn run_list_with_actor_appends_user_flag() {
        let args = workflow_runs("acme/web", 20, Some("octocat"));
        let tail = &args[args.len() - 2..];
        assert_eq!(tail, ["--user", "octocat"]);
    }

    #[test]
    fn pr_templates_carry_limit() {
        let args = review_requested_prs(15);
        assert!(args.contains(&"--review-requested=@me".to_owned()));
        assert_eq!(args.last().map(String::as_str), Some("15"));
    }

    #[test]
    fn run_jobs_targets_run_and_repo() {
        assert_eq!(
            run_jobs("acme/web", "42"),
            ["run", "view", "42", "--repo", "acme/web", "--json", "jobs"]
        );
    }
}
