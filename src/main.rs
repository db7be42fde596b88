use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use gh_panel::config::{Settings, loader};
use gh_panel::engine::{Engine, EngineHandle, Event, PanelEngine, Request, Snapshot};
use gh_panel::gh::CliRunner;
use gh_panel::render::render_snapshot;

#[derive(Parser)]
#[command(name = "gh-panel", version, about = "GitHub pull requests and workflow runs at a glance")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    /// Print snapshots as JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch once, print the snapshot and exit (default).
    Show {
        /// Seconds to wait for the first round to complete.
        #[arg(long, default_value_t = 120)]
        wait: u64,
    },
    /// Keep the panel open and print every update.
    ///
    /// Reads commands from stdin: `r` reload config and refresh, `a` refresh
    /// workflow runs only, `v REPO WORKFLOW` show or hide a workflow until the
    /// next reload, `u` forget the cached login, `q` quit.
    Watch,
    /// Print which config file would be used.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    let (config, source) = loader::load_config(cli.config.as_deref())?;
    let settings = Settings::with_source(config, source);
    if let Some(Commands::Config) = cli.command {
        match settings.source() {
            Some(path) => println!("{}", path.display()),
            None => println!("(no config file; using defaults)"),
        }
        return Ok(());
    }

    let runner = Arc::new(CliRunner::new(settings.current().gh_timeout()));

    // Start the backend engine in a dedicated OS thread (owns its own Tokio
    // runtime). Dropping `engine` at the end of `main` closes the sender
    // channel, signalling the engine to shut down.
    let engine = PanelEngine::with_shared_runner(settings.clone(), Arc::clone(&runner)).start();

    tracing::info!("gh-panel starting");

    match cli.command {
        Some(Commands::Watch) => watch(&engine, &settings, &runner, cli.json),
        Some(Commands::Show { wait }) => show(&engine, &settings, cli.json, wait),
        None | Some(Commands::Config) => show(&engine, &settings, cli.json, 120),
    }
}

fn print_snapshot(snapshot: &Snapshot, settings: &Settings, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        for line in render_snapshot(snapshot, &settings.current()) {
            println!("{line}");
        }
    }
    Ok(())
}

fn open(engine: &EngineHandle) -> Receiver<Event> {
    let (tx, rx) = std::sync::mpsc::channel();
    engine.send(Request::Open { notify_tx: tx });
    rx
}

fn show(engine: &EngineHandle, settings: &Settings, json: bool, wait: u64) -> Result<()> {
    let rx = open(engine);
    match rx.recv_timeout(Duration::from_secs(wait)) {
        Ok(Event::SnapshotUpdated { snapshot }) => print_snapshot(&snapshot, settings, json)?,
        Err(RecvTimeoutError::Timeout) => bail!("no data from gh after {wait}s"),
        Err(RecvTimeoutError::Disconnected) => bail!("engine stopped unexpectedly"),
    }
    engine.send(Request::Shutdown);
    Ok(())
}

fn watch(
    engine: &EngineHandle,
    settings: &Settings,
    runner: &Arc<CliRunner>,
    json: bool,
) -> Result<()> {
    let rx = open(engine);

    let input_engine = engine.clone();
    let input_settings = settings.clone();
    let input_runner = Arc::clone(runner);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let mut words = line.trim().splitn(3, ' ');
            match (words.next(), words.next(), words.next()) {
                (Some("r"), None, None) => {
                    if let Err(e) = input_settings.reload() {
                        eprintln!("config reload failed: {e:#}");
                    }
                    input_runner.set_timeout(input_settings.current().gh_timeout());
                    input_engine.send(Request::Refresh);
                }
                (Some("a"), None, None) => input_engine.send(Request::RefreshActions),
                (Some("v"), Some(repo), Some(workflow)) => {
                    let mut visible = true;
                    input_settings.update(|c| visible = c.toggle_workflow(repo, workflow.trim()));
                    eprintln!(
                        "{repo} {}: {}",
                        workflow.trim(),
                        if visible { "shown" } else { "hidden" }
                    );
                    input_engine.send(Request::RefreshActions);
                }
                (Some("u"), None, None) => input_engine.send(Request::ResetUsername),
                (Some("q"), None, None) => break,
                _ => eprintln!(
                    "commands: r (refresh), a (actions), v REPO WORKFLOW (toggle), u (username), q (quit)"
                ),
            }
        }
        input_engine.send(Request::Shutdown);
    });

    // Ends when the engine shuts down and drops the sender.
    for event in rx {
        match event {
            Event::SnapshotUpdated { snapshot } => {
                println!("---");
                print_snapshot(&snapshot, settings, json)?;
            }
        }
    }
    Ok(())
}
