use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use gh_panel::config::{AppConfig, Settings};
use gh_panel::engine::{Engine, EngineHandle, Event, PanelEngine, Request, Snapshot};
use gh_panel::gh::{StubResponse, StubRunner};

const AUTHORED: &[&str] = &["--author=@me"];
const REVIEW: &[&str] = &["--review-requested=@me"];

fn prs_json(items: &[(u64, &str)]) -> String {
    let prs: Vec<serde_json::Value> = items
        .iter()
        .map(|&(number, title)| {
            serde_json::json!({
                "number": number,
                "title": title,
                "url": format!("https://github.com/acme/web/pull/{number}"),
                "repository": { "name": "web", "nameWithOwner": "acme/web" },
            })
        })
        .collect();
    serde_json::Value::Array(prs).to_string()
}

fn recent_runs_json() -> String {
    let created = (chrono::Utc::now() - chrono::Duration::minutes(10)).to_rfc3339();
    include_str!("fixtures/runs.json").replace("__RECENT__", &created)
}

fn start(stub: StubRunner, config: AppConfig) -> (EngineHandle, Arc<StubRunner>) {
    let stub = Arc::new(stub);
    let engine = PanelEngine::with_shared_runner(Settings::new(config), Arc::clone(&stub));
    (engine.start(), stub)
}

fn open(handle: &EngineHandle) -> Receiver<Event> {
    let (tx, rx) = std::sync::mpsc::channel();
    handle.send(Request::Open { notify_tx: tx });
    rx
}

fn next_snapshot(rx: &Receiver<Event>) -> Snapshot {
    let event = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("engine should reply within 5 seconds");
    match event {
        Event::SnapshotUpdated { snapshot } => snapshot,
    }
}

fn prs_only() -> AppConfig {
    AppConfig {
        show_authored_prs: true,
        show_review_prs: true,
        show_actions: false,
        refresh_interval_minutes: 0,
        ..AppConfig::default()
    }
}

fn titles(snapshot: &Snapshot) -> Vec<String> {
    snapshot.my_prs.iter().map(|pr| pr.title.clone()).collect()
}

#[test]
fn snapshot_is_empty_before_first_round() {
    let (handle, _stub) = start(StubRunner::new(), prs_only());
    let snapshot = handle.snapshot();
    assert!(!snapshot.has_data);
    assert!(snapshot.action_runs.is_none());
}

#[test]
fn commit_carries_all_sources_at_once() {
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "Mine")])))
        .on(
            REVIEW,
            StubResponse::stdout(prs_json(&[(2, "Theirs")])).delayed(Duration::from_millis(200)),
        );
    let (handle, _stub) = start(stub, prs_only());
    let rx = open(&handle);

    let snapshot = next_snapshot(&rx);
    assert!(snapshot.has_data);
    assert_eq!(snapshot.my_prs.len(), 1);
    assert_eq!(snapshot.review_prs.len(), 1);
    assert_eq!(snapshot.review_prs[0].title, "Theirs");
    assert_eq!(snapshot.action_runs, Some(vec![]));
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn superseded_round_is_never_committed() {
    let stub = StubRunner::new()
        .on(
            AUTHORED,
            StubResponse::stdout(prs_json(&[(1, "old")])).delayed(Duration::from_millis(400)),
        )
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "new")])))
        .on(REVIEW, StubResponse::stdout("[]"));
    let (handle, stub) = start(stub, prs_only());
    let rx = open(&handle);

    // Let round 1 dispatch before superseding it.
    std::thread::sleep(Duration::from_millis(50));
    handle.send(Request::Refresh);

    let snapshot = next_snapshot(&rx);
    assert_eq!(titles(&snapshot), ["new"]);

    // Round 1's late reply must be dropped, not committed.
    std::thread::sleep(Duration::from_millis(600));
    while let Ok(Event::SnapshotUpdated { snapshot }) = rx.try_recv() {
        assert_eq!(titles(&snapshot), ["new"]);
    }
    assert_eq!(titles(&handle.snapshot()), ["new"]);
    assert_eq!(stub.call_count(AUTHORED), 2);
}

#[test]
fn all_sources_disabled_still_commits() {
    let config = AppConfig {
        show_authored_prs: false,
        show_review_prs: false,
        show_actions: false,
        refresh_interval_minutes: 0,
        ..AppConfig::default()
    };
    let (handle, stub) = start(StubRunner::new(), config);
    let rx = open(&handle);

    let snapshot = next_snapshot(&rx);
    assert!(snapshot.has_data);
    assert!(snapshot.my_prs.is_empty());
    assert!(snapshot.review_prs.is_empty());
    assert_eq!(snapshot.action_runs, Some(vec![]));
    assert!(stub.calls().is_empty());
}

#[test]
fn source_failures_degrade_to_empty() {
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::fail("gh: To get started with GitHub CLI, please run: gh auth login"))
        .on(REVIEW, StubResponse::stdout("this is not json"));
    let (handle, _stub) = start(stub, prs_only());
    let rx = open(&handle);

    let snapshot = next_snapshot(&rx);
    assert!(snapshot.has_data);
    assert!(snapshot.my_prs.is_empty());
    assert!(snapshot.review_prs.is_empty());
}

#[test]
fn reopen_serves_cached_snapshot_first() {
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "cached")])))
        .on(
            AUTHORED,
            StubResponse::stdout(prs_json(&[(1, "fresh")])).delayed(Duration::from_millis(300)),
        )
        .on(REVIEW, StubResponse::stdout("[]"));
    let (handle, _stub) = start(stub, prs_only());

    let rx = open(&handle);
    assert_eq!(titles(&next_snapshot(&rx)), ["cached"]);
    handle.send(Request::Close);

    let rx = open(&handle);
    assert_eq!(titles(&next_snapshot(&rx)), ["cached"]);
    assert_eq!(titles(&next_snapshot(&rx)), ["fresh"]);
}

#[test]
fn closed_panel_is_not_notified() {
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "first")])))
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "second")])))
        .on(REVIEW, StubResponse::stdout("[]"));
    let (handle, _stub) = start(stub, prs_only());
    let rx = open(&handle);
    assert_eq!(titles(&next_snapshot(&rx)), ["first"]);

    handle.send(Request::Close);
    handle.send(Request::Refresh);

    let deadline = Instant::now() + Duration::from_secs(5);
    while titles(&handle.snapshot()) != ["second"] {
        assert!(Instant::now() < deadline, "refresh never committed");
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(handle.snapshot().has_data);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn actions_refresh_keeps_pr_data() {
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "A")])))
        .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "B")])))
        .on(REVIEW, StubResponse::stdout("[]"))
        .on(&["run", "list"], StubResponse::stdout(recent_runs_json()))
        .on(
            &["run", "view"],
            StubResponse::stdout(include_str!("fixtures/run_jobs.json")),
        );
    let config = AppConfig {
        show_actions: true,
        actions_repos: "acme/web".to_owned(),
        ..prs_only()
    };
    let (handle, stub) = start(stub, config);
    let rx = open(&handle);

    let first = next_snapshot(&rx);
    let runs = first.action_runs.expect("runs committed");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].repo, "acme/web");
    assert_eq!(runs[0].steps_total, Some(4));
    assert_eq!(runs[0].steps_done, Some(2));

    handle.send(Request::RefreshActions);
    let in_flight = next_snapshot(&rx);
    assert!(in_flight.action_runs.is_none());
    assert_eq!(titles(&in_flight), ["A"]);

    let refreshed = next_snapshot(&rx);
    assert_eq!(refreshed.action_runs.as_ref().map(|r| r.len()), Some(1));
    assert_eq!(titles(&refreshed), ["A"]);
    assert_eq!(stub.call_count(AUTHORED), 1);
    assert_eq!(stub.call_count(&["run", "list"]), 2);
}

#[test]
fn empty_repo_list_yields_no_runs_and_no_calls() {
    let config = AppConfig {
        show_actions: true,
        actions_repos: " , ".to_owned(),
        ..prs_only()
    };
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::stdout("[]"))
        .on(REVIEW, StubResponse::stdout("[]"));
    let (handle, stub) = start(stub, config);
    let rx = open(&handle);

    let snapshot = next_snapshot(&rx);
    assert_eq!(snapshot.action_runs, Some(vec![]));
    assert_eq!(stub.call_count(&["run"]), 0);
}

#[test]
fn username_is_looked_up_once_across_rounds() {
    let config = AppConfig {
        show_authored_prs: false,
        show_review_prs: false,
        show_actions: true,
        actions_repos: "acme/web".to_owned(),
        actions_only_mine: true,
        refresh_interval_minutes: 0,
        ..AppConfig::default()
    };
    let stub = StubRunner::new()
        .on(&["api", "user"], StubResponse::stdout("octocat\n"))
        .on(&["run", "list"], StubResponse::stdout("[]"));
    let (handle, stub) = start(stub, config);
    let rx = open(&handle);

    next_snapshot(&rx);
    handle.send(Request::Refresh);
    next_snapshot(&rx);

    assert_eq!(stub.call_count(&["api", "user"]), 1);
    assert_eq!(stub.call_count(&["run", "list", "--user", "octocat"]), 2);
}

#[test]
fn reset_username_triggers_a_new_lookup() {
    let config = AppConfig {
        show_authored_prs: false,
        show_review_prs: false,
        show_actions: true,
        actions_repos: "acme/web".to_owned(),
        actions_only_mine: true,
        refresh_interval_minutes: 0,
        ..AppConfig::default()
    };
    let stub = StubRunner::new()
        .on(&["api", "user"], StubResponse::stdout("octocat"))
        .on(&["run", "list"], StubResponse::stdout("[]"));
    let (handle, stub) = start(stub, config);
    let rx = open(&handle);

    next_snapshot(&rx);
    handle.send(Request::ResetUsername);
    handle.send(Request::Refresh);
    next_snapshot(&rx);

    assert_eq!(stub.call_count(&["api", "user"]), 2);
}

#[test]
fn settings_are_read_at_round_start() {
    let stub = Arc::new(
        StubRunner::new()
            .on(AUTHORED, StubResponse::stdout(prs_json(&[(1, "Mine")])))
            .on(REVIEW, StubResponse::stdout(prs_json(&[(2, "Theirs")]))),
    );
    let settings = Settings::new(prs_only());
    let handle = PanelEngine::with_shared_runner(settings.clone(), Arc::clone(&stub)).start();
    let rx = open(&handle);
    assert_eq!(next_snapshot(&rx).review_prs.len(), 1);

    settings.update(|c| c.show_review_prs = false);
    handle.send(Request::Refresh);
    let snapshot = next_snapshot(&rx);
    assert!(snapshot.review_prs.is_empty());
    assert_eq!(stub.call_count(REVIEW), 1);
}

#[test]
fn late_actions_refresh_never_overwrites_newer_round() {
    let stub = StubRunner::new()
        .on(AUTHORED, StubResponse::stdout("[]"))
        .on(REVIEW, StubResponse::stdout("[]"))
        .on(&["run", "list"], StubResponse::stdout(recent_runs_json()))
        .on(
            &["run", "list"],
            StubResponse::stdout(recent_runs_json()).delayed(Duration::from_millis(400)),
        )
        .on(&["run", "list"], StubResponse::stdout("[]"))
        .on(
            &["run", "view"],
            StubResponse::stdout(include_str!("fixtures/run_jobs.json")),
        );
    let config = AppConfig {
        show_actions: true,
        actions_repos: "acme/web".to_owned(),
        ..prs_only()
    };
    let (handle, stub) = start(stub, config);
    let rx = open(&handle);
    assert_eq!(next_snapshot(&rx).action_runs.map(|r| r.len()), Some(1));

    handle.send(Request::RefreshActions);
    assert!(next_snapshot(&rx).action_runs.is_none());

    // Supersede the partial round while its run list is still pending.
    std::thread::sleep(Duration::from_millis(50));
    handle.send(Request::Refresh);
    assert_eq!(next_snapshot(&rx).action_runs, Some(vec![]));

    std::thread::sleep(Duration::from_millis(600));
    while let Ok(Event::SnapshotUpdated { snapshot }) = rx.try_recv() {
        assert_eq!(snapshot.action_runs, Some(vec![]));
    }
    assert_eq!(handle.snapshot().action_runs, Some(vec![]));
    assert_eq!(stub.call_count(&["run", "list"]), 3);
    assert_eq!(stub.call_count(&["run", "view"]), 1);
}

#[test]
fn oversized_hours_window_still_commits() {
    let config = AppConfig {
        show_authored_prs: false,
        show_review_prs: false,
        show_actions: true,
        actions_repos: "acme/web".to_owned(),
        actions_hours_window: u32::MAX,
        refresh_interval_minutes: 0,
        ..AppConfig::default()
    };
    let stub = StubRunner::new()
        .on(&["run", "list"], StubResponse::stdout(recent_runs_json()))
        .on(
            &["run", "view"],
            StubResponse::stdout(include_str!("fixtures/run_jobs.json")),
        );
    let (handle, _stub) = start(stub, config);
    let rx = open(&handle);

    let snapshot = next_snapshot(&rx);
    assert!(snapshot.has_data);
    assert_eq!(snapshot.action_runs.map(|r| r.len()), Some(1));
}
